//! Scheduling core for the calendar service.
//!
//! This crate owns everything both network adapters and both storage
//! backends agree on:
//!
//! - **[`Event`]** -- the scheduled entity and its interval arithmetic
//! - **[`Repository`]** -- the capability set every backend implements,
//!   together with the [`StorageError`] taxonomy
//! - **[`TimeWindow`]** -- half-open day/week/month windows in UTC
//! - **[`Context`]** -- cancellable, deadline-bearing execution context
//!   threaded through every repository call
//! - **[`MemoryStore`]** -- the lock-guarded in-memory backend
//! - **[`Calendar`]** -- the application facade shared by the adapters
//! - **[`config`]** -- typed service configuration loaded from YAML
//!
//! # Overlap invariant
//!
//! For a fixed user, no two stored events may share an instant. Both
//! backends enforce this atomically on every create and update; see
//! [`Event::overlaps`] for the exact interval test.

pub mod app;
pub mod config;
pub mod context;
pub mod event;
pub mod memory;
pub mod repository;
pub mod window;

// Re-export primary types for convenience.
pub use app::Calendar;
pub use config::{CalendarConfig, ConfigError};
pub use context::{CancelToken, Context};
pub use event::Event;
pub use memory::MemoryStore;
pub use repository::{Repository, StorageError};
pub use window::TimeWindow;

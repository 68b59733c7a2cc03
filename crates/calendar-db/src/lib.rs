//! `PostgreSQL` backend for the calendar service.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool configuration and migrations
//! - [`event_store`] -- [`PgEventStore`], the transactional
//!   [`Repository`](calendar_core::Repository) implementation
//! - [`error`] -- [`DbError`] and its mapping onto
//!   [`StorageError`](calendar_core::StorageError)
//!
//! # Write isolation
//!
//! Every create and update runs in one transaction that first takes a
//! transaction-scoped advisory lock keyed by the owning user. Writers for
//! the same user are therefore serialized across every connection in the
//! pool (and every process sharing the database), so the overlap check
//! and the write can never interleave with a competing writer.

pub mod error;
pub mod event_store;
pub mod postgres;

// Re-export primary types for convenience.
pub use error::DbError;
pub use event_store::{EventRow, PgEventStore};
pub use postgres::{PostgresConfig, PostgresPool};

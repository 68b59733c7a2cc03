//! JSON API for the calendar service.
//!
//! This crate provides an Axum HTTP server that exposes the
//! [`Calendar`](calendar_core::Calendar) facade:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Liveness greeting |
//! | `POST` | `/events` | Create an event |
//! | `PUT` | `/events/{id}` | Replace an event |
//! | `DELETE` | `/events/{id}` | Delete an event |
//! | `GET` | `/events/day` | A user's events on one day |
//! | `GET` | `/events/week` | A user's events in a seven-day week |
//! | `GET` | `/events/month` | A user's events in a calendar month |
//!
//! Every request is logged by [`middleware::log_requests`] and runs its
//! storage calls under the configured request deadline.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{HttpServer, ServerConfig, ServerError};
pub use state::AppState;

//! Error types for the calendar service binary.

use std::time::Duration;

/// Top-level error for the service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `run` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: calendar_core::ConfigError,
    },

    /// Connecting to or migrating the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: calendar_db::DbError,
    },

    /// The JSON API server failed to bind or serve.
    #[error("HTTP server error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: calendar_http::ServerError,
    },

    /// The gRPC server failed to bind or serve.
    #[error("gRPC server error: {source}")]
    Grpc {
        /// The underlying server error.
        #[from]
        source: calendar_grpc::GrpcServerError,
    },

    /// A server task panicked or was aborted.
    #[error("server task failed: {message}")]
    Task {
        /// Description of the task failure.
        message: String,
    },

    /// The servers did not drain within the shutdown budget.
    #[error("servers still running after {0:?}; aborted")]
    ShutdownTimeout(Duration),
}

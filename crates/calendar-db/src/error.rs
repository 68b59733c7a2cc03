//! Error types for the data layer.
//!
//! All failures are propagated via [`DbError`]. Crossing the
//! [`Repository`](calendar_core::Repository) boundary they become
//! [`StorageError::Backend`], keeping the source for server-side logs.

use calendar_core::StorageError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value does not fit its column or its in-memory type.
    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        Self::backend(err)
    }
}

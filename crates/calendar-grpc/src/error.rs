//! Error types for the gRPC adapter.

use calendar_core::StorageError;
use tonic::Status;

/// Map a storage error onto the closest gRPC status.
///
/// Backend failures are logged here and reach the caller only as a
/// generic `Internal`.
pub fn status_from_storage(err: StorageError) -> Status {
    match err {
        StorageError::DateBusy => Status::failed_precondition(err.to_string()),
        StorageError::NotFound => Status::not_found(err.to_string()),
        StorageError::AlreadyExists => Status::already_exists(err.to_string()),
        StorageError::Cancelled => Status::cancelled(err.to_string()),
        StorageError::DeadlineExceeded => Status::deadline_exceeded(err.to_string()),
        StorageError::Backend(_) => {
            tracing::error!(error = %err, "storage backend failure");
            Status::internal("internal error")
        }
    }
}

/// Errors that can occur when starting or running the gRPC server.
#[derive(Debug, thiserror::Error)]
pub enum GrpcServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The tonic transport failed while serving.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

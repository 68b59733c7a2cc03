//! Error types for the JSON API.
//!
//! [`ApiError`] unifies request validation failures and storage errors
//! into a single enum that converts into an Axum HTTP response via its
//! [`IntoResponse`] implementation. Bodies are always
//! `{"error": message, "status": code}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use calendar_core::StorageError;

/// Errors that can occur in the JSON API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or query string is malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The storage layer rejected or failed the operation.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Storage(err @ (StorageError::DateBusy | StorageError::AlreadyExists)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            Self::Storage(err @ StorageError::NotFound) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Storage(err @ (StorageError::Cancelled | StorageError::DeadlineExceeded)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Storage(err @ StorageError::Backend(_)) => {
                tracing::error!(error = %err, "storage backend failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal server error"),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

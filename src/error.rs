//! Error handling for the veristation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Camera access denied by the OS / permission layer
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable capture device for the requested facing
    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Frame grab or JPEG encode failure
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Submission is missing one or more required sides
    #[error("Incomplete shot set: {0}")]
    IncompleteSet(String),

    /// Object storage upload failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Verification record creation failure
    #[error("Record error: {0}")]
    Record(String),

    /// Verification record update failure (status gate, replacement)
    #[error("Update error: {0}")]
    Update(String),

    /// Operator-supplied input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// List/detail read failure
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Error::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg.clone())
            }
            Error::DeviceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DEVICE_UNAVAILABLE",
                msg.clone(),
            ),
            Error::Encoding(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ENCODING_ERROR",
                msg.clone(),
            ),
            Error::IncompleteSet(msg) => (StatusCode::BAD_REQUEST, "INCOMPLETE_SET", msg.clone()),
            Error::Storage(msg) => (StatusCode::BAD_GATEWAY, "STORAGE_ERROR", msg.clone()),
            Error::Record(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RECORD_ERROR",
                msg.clone(),
            ),
            Error::Update(msg) => (StatusCode::CONFLICT, "UPDATE_ERROR", msg.clone()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Error::Fetch(msg) => (StatusCode::BAD_GATEWAY, "FETCH_ERROR", msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            Error::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_ERROR",
                e.to_string(),
            ),
            Error::Http(e) => (StatusCode::BAD_GATEWAY, "HTTP_ERROR", e.to_string()),
            Error::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", e.to_string()),
            Error::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
            Error::Sqlx(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                e.to_string(),
            ),
        };

        tracing::error!(
            status = %status,
            error_code = %error_code,
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}

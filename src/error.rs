//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure reported by a persistence backend.
///
/// Every [`crate::storage::Storage`] call returns this; services pass it on
/// unchanged and the caller decides whether to degrade or surface it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// PostgreSQL query or connection failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading or writing a local blob file failed.
    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A local blob holds something that is not the expected JSON array.
    #[error("Blob serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur while serving a request.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Persistence Errors**: any [`StorageError`] from the configured backend
/// - **Validation Errors**: wrong admin password, unknown or disabled access key
/// - **Session Errors**: missing, unknown or expired session token
/// - **Request Errors**: invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Persistence backend failed.
    ///
    /// Returns HTTP 500. Details are logged, never sent to the client.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Submitted password or access key did not match.
    ///
    /// Returns HTTP 401 Unauthorized. Wrong, disabled and unknown keys all map here
    /// so callers cannot tell them apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session token is missing, unknown or expired.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Session required")]
    Unauthorized,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidCredentials` → 401 Unauthorized
/// - `Unauthorized` → 401 Unauthorized
/// - `InvalidRequest` → 400 Bad Request
/// - `Storage` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Storage(ref err) => {
                tracing::error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

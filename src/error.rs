//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//!
//! Negative license outcomes (not found, suspended, HWID mismatch) are NOT errors.
//! They are successful responses with `valid: false`, see `models::license`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure of the persistent store.
///
/// Every store failure surfaces to callers as [`AppError::Internal`]. No retry happens inside the service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed (connection error, query error, pool timeout).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store refused the operation without reaching a database.
    #[error("store unavailable")]
    Unavailable,
}

/// Application-wide error type.
///
/// # Error Categories
///
/// - **InvalidArgument**: malformed or missing required input (e.g. empty API key)
/// - **Unauthenticated**: missing/invalid access token or API key, missing caller metadata
/// - **PermissionDenied**: wrong admin secret
/// - **Internal**: store unreachable or unexpected store error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    InvalidArgument(String),

    /// Caller could not be authenticated.
    ///
    /// Returns HTTP 401 Unauthorized. The message never says whether a token was
    /// never issued, already redeemed, or expired.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Caller is authenticated but not allowed to perform the operation.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("{0}")]
    PermissionDenied(&'static str),

    /// Store operation failed.
    ///
    /// Returns HTTP 500 and hides the cause from the client.
    #[error("internal error: {0}")]
    Internal(#[from] StoreError),
}

impl AppError {
    /// Stable machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unreadable JSON bodies are reported in the standard error shape instead of axum's plain text.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "unauthenticated",
///     "message": "invalid or expired access token"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(cause) => {
                tracing::error!(error = %cause, "store operation failed");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}

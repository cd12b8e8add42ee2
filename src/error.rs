//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Authentication Errors**: Missing or rejected bearer tokens, missing roles
/// - **Validation Errors**: Invalid request data
/// - **Resource Errors**: Requested rows not found or already in a final state
/// - **Upstream Errors**: Identity, SIRI or verification services failing
/// - **Database Errors**: Any sqlx::Error from database operations
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Bearer token is missing, malformed, or rejected by the identity service.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Missing or invalid bearer token")]
    Unauthorized,

    /// Caller is authenticated but lacks the admin role.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Admin access required")]
    Forbidden,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Body is not JSON, or does not match the expected shape.
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    /// Path segment could not be parsed (e.g. an id that is not a UUID).
    #[error(transparent)]
    PathParam(#[from] PathRejection),

    #[error(transparent)]
    QueryParam(#[from] QueryRejection),

    /// Returns HTTP 404 Not Found.
    #[error("{0}")]
    NotFound(String),

    /// The payment's payout has already been completed.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Payout already completed")]
    PayoutAlreadyCompleted,

    /// One or more settings keys failed to persist.
    ///
    /// The String carries the per-key messages joined together.
    #[error("Failed to update settings: {0}")]
    SettingsUpdate(String),

    /// SIRI proxy URL is not configured.
    #[error("SIRI proxy is not configured")]
    ProxyNotConfigured,

    /// Verification service URL is not configured.
    #[error("Incident verification service is not configured")]
    VerifierNotConfigured,

    /// An external dependency answered with an error or could not be reached.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("{0}")]
    Upstream(String),

    /// An external dependency did not answer in time.
    ///
    /// Returns HTTP 504 Gateway Timeout.
    #[error("{0}")]
    UpstreamTimeout(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::InvalidRequest(_)
            | AppError::JsonBody(_)
            | AppError::PathParam(_)
            | AppError::QueryParam(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::PayoutAlreadyCompleted => (StatusCode::CONFLICT, "PAYOUT_ALREADY_COMPLETED"),
            AppError::SettingsUpdate(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SETTINGS_UPDATE_FAILED")
            }
            AppError::ProxyNotConfigured => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROXY_NOT_CONFIGURED")
            }
            AppError::VerifierNotConfigured => {
                (StatusCode::INTERNAL_SERVER_ERROR, "VERIFIER_NOT_CONFIGURED")
            }
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::UpstreamTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "PAYOUT_ALREADY_COMPLETED",
///     "message": "Payout already completed"
///   }
/// }
/// ```
///
/// Database and internal errors are logged and replaced by a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                "An internal error occurred".to_string()
            }
            AppError::Internal(ref msg) => {
                tracing::error!(error = %msg, "internal error");
                "An internal error occurred".to_string()
            }
            AppError::InvalidRequest(ref msg) => msg.clone(),
            AppError::JsonBody(ref rejection) => rejection.body_text(),
            AppError::PathParam(ref rejection) => rejection.body_text(),
            AppError::QueryParam(ref rejection) => rejection.body_text(),
            _ => self.to_string(),
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

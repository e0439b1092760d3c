use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// One variant per caller-visible failure: validation failures are
/// client-caused and terminal, `RateLimited` is time-bounded (retry after the
/// window elapses), and `DatabaseError` is server-caused (caller may retry).
#[derive(Debug)]
pub enum AppError {
    /// Bad request error (unparseable payload or failed field validation).
    /// Carries the exact message surfaced to the submitter.
    BadRequest(String),
    /// Too many recent submissions from the same client IP.
    RateLimited,
    /// Database-related errors (rate-check query or insert failed).
    DatabaseError(sqlx::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::RateLimited => write!(f, "Rate limited"),
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Validation rejections echo their message with `success: false` so the
    /// form client can render it verbatim. Database detail is logged
    /// server-side and never leaks past the opaque failure message.
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": msg })),
            )
                .into_response(),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "Too many submissions. Please try again later." })),
            )
                .into_response(),
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to save lead" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

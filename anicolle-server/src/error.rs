//! Error types for anicolle-server
//!
//! [MB-ERR]: every handler returns `ApiResult<T>`; failures render as
//! `{"error": {"code": ..., "message": ...}}` with a matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::anime_client::AnimeApiError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid session (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to touch this resource (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict (409), e.g. nick name already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream anime API failed (502)
    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;

impl From<anicolle_common::Error> for ApiError {
    fn from(err: anicolle_common::Error) -> Self {
        use anicolle_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Database(e) => ApiError::Database(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AnimeApiError> for ApiError {
    fn from(err: AnimeApiError) -> Self {
        ApiError::BadGateway(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => {
                warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Unauthorized(msg) => {
                warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
            }
            ApiError::Forbidden(msg) => {
                warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg)
            }
            ApiError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }
            ApiError::BadGateway(msg) => {
                warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Database(ref err) => {
                error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "database operation failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures raised by the recommendation store and its backends
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Redis {op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("Malformed recommendation record: {0}")]
    MalformedRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Expiry of {0}s is out of range")]
    InvalidTtl(u64),
}

impl StoreError {
    /// True when the backend could not be reached or did not answer in time
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Backend(_) | StoreError::Timeout { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Store(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

//! Error types for the blurhash server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::imaging::DecodeError;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Failures raised by a validator store.
///
/// These never reach a client: the negotiator treats a failed read as a miss
/// and a failed write as a no-op.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key rejected by the store
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Backing store could not be reached
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

// == App Error Enum ==
/// Request-level error type, rendered as a JSON error body.
#[derive(Error, Debug)]
pub enum AppError {
    /// Path or query parameter outside its allowed range
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Image could not be fetched or decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is surfaced with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Decode(DecodeError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Decode(DecodeError::Unreachable(_))
            | AppError::Decode(DecodeError::UpstreamStatus(_)) => StatusCode::BAD_GATEWAY,
            AppError::Decode(DecodeError::Unsupported(_))
            | AppError::Decode(DecodeError::TooLarge(_))
            | AppError::Decode(DecodeError::EmptyImage) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Decode(DecodeError::Encode(_))
            | AppError::Decode(DecodeError::Worker(_))
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handlers.
pub type Result<T> = std::result::Result<T, AppError>;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::core::tts::TTSError;

/// Application error type
///
/// The HTTP-facing view of pipeline failures. Bodies carry a short message
/// only; diagnostic detail goes to the log.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    SynthesisFailed(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }
            AppError::SynthesisFailed(msg) => {
                tracing::error!("Synthesis failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Speech synthesis failed".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::SynthesisFailed(msg) => write!(f, "Synthesis failed: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal server error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<TTSError> for AppError {
    fn from(err: TTSError) -> Self {
        match err {
            TTSError::InvalidInput(msg) => AppError::BadRequest(msg),
            other => AppError::SynthesisFailed(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

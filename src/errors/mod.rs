//! Error taxonomy for the chat gateway
//!
//! Every failure on the request path is a `GatewayError`. Each variant maps to
//! exactly one HTTP status and one human-readable `detail` string, which is the
//! only thing a caller ever sees.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error("No messages provided or invalid format")]
    MissingMessages,

    #[error("Last message must have role 'user'")]
    WrongRole,

    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("Runner command not found: {binary}")]
    RunnerNotFound { binary: String },

    #[error("Runner failed ({code}): {stderr}")]
    RunnerFailed { code: i32, stderr: String },

    #[error("Runner I/O error: {0}")]
    RunnerIo(#[from] std::io::Error),
}

impl GatewayError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidJson
            | GatewayError::MissingMessages
            | GatewayError::WrongRole
            | GatewayError::EmptyPrompt => StatusCode::BAD_REQUEST,
            GatewayError::RunnerNotFound { .. }
            | GatewayError::RunnerFailed { .. }
            | GatewayError::RunnerIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// HTTP MAPPING
// =============================================================================

/// Error body shape: `{"detail": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Note: a renewal confirmation that finds the service no longer eligible is
/// NOT an error; it is reported as a successful no-op response by the
/// renewal workflow.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Session not found: {0}")]
    UnknownSession(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("OpenAI API error: {0}")]
    OpenAiApi(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::UnknownSession(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                Some(format!("User {id} not found")),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::OpenAiApi(msg) => {
                tracing::warn!(error = %msg, "OpenAI API error");
                (StatusCode::BAD_GATEWAY, "openai_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

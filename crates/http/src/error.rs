//! Error handling for the bookshelf HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// `error.message` is a single string for most failures and a list of
/// violations for schema validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

/// Inner object of the `{"error": {...}}` envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: ErrorMessage,
    pub status: u16,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error from the collected violations
    pub fn validation(violations: Vec<String>) -> Self {
        Self::Validation(violations)
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let message = match self {
            AppError::Validation(violations) => {
                tracing::warn!(
                    error_id = %error_id,
                    status_code = status.as_u16(),
                    violations = ?violations,
                    "request failed validation"
                );
                ErrorMessage::Many(violations)
            }
            AppError::BadRequest(message) | AppError::NotFound(message) => {
                tracing::warn!(
                    error_id = %error_id,
                    status_code = status.as_u16(),
                    %message,
                    "request error"
                );
                ErrorMessage::Single(message)
            }
            AppError::Internal(e) => {
                tracing::error!(
                    error_id = %error_id,
                    status_code = status.as_u16(),
                    error = ?e,
                    "internal error"
                );
                // In release builds the cause stays in the logs only
                if cfg!(debug_assertions) {
                    ErrorMessage::Single(format!("{e:#}"))
                } else {
                    ErrorMessage::Single("An internal server error occurred".to_string())
                }
            }
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                message,
                status: status.as_u16(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}

//! Error handling for the bookstore HTTP layer

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Body returned for 400 responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationBody {
    pub errors: Vec<String>,
}

/// Body returned for every non-validation error.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
    pub status: u16,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error from one message per violated constraint
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(vec![rejection.body_text()])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(vec![rejection.body_text()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::Validation { errors } => {
                tracing::debug!(count = errors.len(), "request failed validation");
                (status, Json(ValidationBody { errors })).into_response()
            }
            AppError::NotFound { message } => {
                tracing::debug!(%message, "resource not found");
                error_response(status, message)
            }
            AppError::Internal(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = ?e,
                    "request failed"
                );
                // Internal detail stays in the log.
                error_response(status, INTERNAL_MESSAGE.to_string())
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            message,
            status: status.as_u16(),
        },
    };
    (status, Json(body)).into_response()
}

/// Fallback for unmatched routes
pub async fn not_found_fallback() -> AppError {
    AppError::not_found("Not Found")
}

// ABOUTME: Error type for the token management API
// ABOUTME: Maps service and storage failures to sanitized JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use tessera_storage::StorageError;

use crate::service::TokenError;

/// Error type returned by every management handler
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Token limit reached ({max})")]
    TokenLimit { max: u32 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error")]
    Storage(#[source] StorageError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::LimitReached { max, .. } => AppError::TokenLimit { max },
            StorageError::Duplicate(_) => AppError::Conflict("Token already exists".to_string()),
            other => AppError::Storage(other),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidId(e) => AppError::Validation(e.to_string()),
            TokenError::UnknownPolicy(name) => {
                AppError::Validation(format!("Unknown policy '{}'", name))
            }
            TokenError::Storage(e) => e.into(),
        }
    }
}

impl AppError {
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::TokenLimit { .. } => (StatusCode::FORBIDDEN, "TOKEN_LIMIT_REACHED"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// User-facing message, with backend detail stripped
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => format!("Validation failed: {}", msg),
            AppError::NotFound => "The requested token was not found".to_string(),
            AppError::Unauthorized { .. } => "Authentication required".to_string(),
            AppError::TokenLimit { max } => {
                format!("Token limit of {} reached for this policy", max)
            }
            AppError::Conflict(msg) => msg.clone(),
            AppError::Storage(_) => "Data storage error".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();
        let user_message = self.to_user_message();

        match &self {
            AppError::Internal(err) => {
                error!(
                    request_id = %request_id,
                    error = %err,
                    "Internal server error occurred"
                );
            }
            AppError::Storage(err) => {
                error!(
                    request_id = %request_id,
                    storage_error = %err,
                    "Storage system error"
                );
            }
            AppError::Unauthorized { message } => {
                tracing::warn!(
                    request_id = %request_id,
                    reason = %message,
                    audit = true,
                    "Unauthorized token management request"
                );
            }
            _ => {
                tracing::info!(
                    request_id = %request_id,
                    error_code = %error_code,
                    error = %self,
                    "API error response"
                );
            }
        }

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: user_message,
            },
            request_id,
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

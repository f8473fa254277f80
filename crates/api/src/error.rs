//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; failures surface as a JSON body `{"detail": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::accounts::AccountError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account workflow operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Malformed request payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Permission denied")]
    PermissionDenied,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Account(err) => match err {
                AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AccountError::Repository(_) | AccountError::Jwt(_) | AccountError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                // Business/validation failures are all 400s: duplicate email,
                // bad or expired code, precondition failures, mismatches.
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn detail(&self) -> String {
        match self {
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Account(err) => match err {
                AccountError::Repository(_) | AccountError::Jwt(_) | AccountError::PasswordHash => {
                    "Internal server error".to_string()
                }
                AccountError::DuplicateAccount => {
                    "User with this email already exists.".to_string()
                }
                other => format!("{other}"),
            },
            Self::PermissionDenied => {
                "You do not have permission to perform this action.".to_string()
            }
            Self::Validation(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

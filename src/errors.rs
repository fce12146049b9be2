use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error; // Use thiserror for cleaner error definitions

use crate::models::ValidationError;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Database backend error: {0:#}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer

    #[error("Stored meme data is corrupt: {0}")]
    DataCorruption(String),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid meme ID: {0}")]
    InvalidId(String),
    #[error("Invalid meme: {0}")]
    Validation(#[from] ValidationError),

    // Domain/Service level errors (mapped from RepoError)
    #[error("Meme not found with ID: {0}")]
    MemeNotFound(i64),
    #[error("Could not access meme data")]
    RepositoryError(#[source] RepoError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::InvalidId(msg) => (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid meme ID: {}", msg)),
            AppError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid meme: {}", e)),
            AppError::MemeNotFound(id) => (StatusCode::NOT_FOUND, format!("Meme not found with ID: {}", id)),

            // 5xx Server Errors
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database operation failed".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::IoError(e) => {
                tracing::error!(error.source = ?e, "I/O error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        if status.is_client_error() {
            tracing::warn!(error.message = %error_message, error.status = %status, "Rejecting request");
        } else {
            tracing::error!(error.message = %error_message, error.detail = %self, "Responding with error");
        }

        // Build JSON response
        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}

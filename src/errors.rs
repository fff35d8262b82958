use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::onesignal_client::ProviderError;
use crate::services::storage_client::StorageError;

/// Message returned when the push provider rejects a dispatch.
pub const DISPATCH_UPSTREAM_MESSAGE: &str = "Failed to send notification via OneSignal";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{context}: {details}")]
    Upstream { context: String, details: String },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidRequest(message.into())
    }

    /// Wrap a provider failure, keeping a rejected response body verbatim.
    pub fn upstream(context: impl Into<String>, error: ProviderError) -> Self {
        let details = match error {
            ProviderError::Rejected { body, .. } => body,
            other => other.to_string(),
        };
        AppError::Upstream {
            context: context.into(),
            details,
        }
    }

    /// Wrap a storage failure the same way as a provider failure.
    pub fn storage(context: impl Into<String>, error: StorageError) -> Self {
        let details = match error {
            StorageError::Rejected { body, .. } => body,
            other => other.to_string(),
        };
        AppError::Upstream {
            context: context.into(),
            details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::InvalidRequest(message)
            | AppError::NotFound(message)
            | AppError::Forbidden(message) => json!({ "error": message }),
            AppError::Unauthorized => json!({ "error": "Unauthorized" }),
            AppError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            AppError::Upstream { context, details } => {
                tracing::error!("{}: {}", context, details);
                json!({ "error": context, "details": details })
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({ "error": "Database error", "details": e.to_string() })
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                json!({ "error": "Internal server error", "details": e.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

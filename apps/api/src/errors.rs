use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so every failure leaves the service as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Generation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Configuration(_)
            | AppError::Fetch(_)
            | AppError::Timeout(_)
            | AppError::Generation(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Configuration(msg) => tracing::error!("Configuration error: {msg}"),
            AppError::Fetch(msg) => tracing::error!("Fetch error: {msg}"),
            AppError::Timeout(msg) => tracing::error!("Timeout: {msg}"),
            AppError::Generation(msg) => tracing::error!("Generation error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => tracing::debug!("Request rejected ({status}): {self}"),
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

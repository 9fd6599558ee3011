use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::CacheError;
use crate::jobs_client::UpstreamError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream(UpstreamError::NotConfigured) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_NOT_CONFIGURED",
                "The listings API key is not configured".to_string(),
            ),
            AppError::Upstream(e @ UpstreamError::Auth { .. }) => {
                tracing::error!("Listings API authentication failed: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_AUTH_ERROR",
                    "The listings API rejected the configured key".to_string(),
                )
            }
            AppError::Upstream(UpstreamError::RateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "The listings API is rate limiting requests. Please try again in a few minutes."
                    .to_string(),
            ),
            AppError::Upstream(e) => {
                tracing::error!("Listings API error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The listings API request failed".to_string(),
                )
            }
            AppError::Cache(e) => {
                tracing::error!("Cache error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    "A cache storage error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

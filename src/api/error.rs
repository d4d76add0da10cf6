//! API error type and response mapping.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Per-request failure surfaced to the client.
///
/// Every variant maps to a status code and a structured JSON body
/// `{"error": ...}`. No failure is fatal to the process and none is
/// retried internally; 429 responses carry `Retry-After` so the client
/// can pace itself.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid_credential")]
    InvalidCredential,

    #[error("rate_limited")]
    RateLimited { retry_in: Duration },

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("not_found")]
    NotFound,

    #[error("server_misconfiguration")]
    ServerMisconfiguration,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized | ApiError::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ServerMisconfiguration | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            // Storage details stay in the logs, not on the wire.
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "storage_error".to_string()
            }
            other => other.to_string(),
        };

        let mut response =
            (status, Json(serde_json::json!({ "error": message }))).into_response();

        if let ApiError::RateLimited { retry_in } = self {
            let secs = retry_in.as_secs_f64().ceil().max(1.0) as u64;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

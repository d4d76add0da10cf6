//! Login, logout, and session status handlers.

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::api::{client_ip, error::ApiError};
use crate::auth::{credentials, session};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::rate_limit::Decision;

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
}

/// `POST /api/login`.
///
/// Consults the login-attempt limiter before the password is even looked
/// at, so a flood of bad guesses cannot probe the verifier.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let ip = client_ip(&headers, peer);

    if let Decision::Limited { retry_in } = state.login_limiter.hit(&ip) {
        tracing::warn!(client = %ip, "Login attempt ceiling exceeded");
        metrics::record_login("throttled");
        metrics::record_rate_limited("login");
        return Err(ApiError::RateLimited { retry_in });
    }

    let config = state.config.load_full();
    if config.auth.admin_password.is_empty() {
        tracing::error!("ADMIN_PASSWORD is not configured; refusing login");
        return Err(ApiError::ServerMisconfiguration);
    }

    let request: LoginRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::InvalidInput("invalid request body".to_string()))?;

    if !credentials::verify(&request.password, &config.auth.admin_password) {
        tracing::warn!(client = %ip, "Invalid password");
        metrics::record_login("failure");
        return Err(ApiError::InvalidCredential);
    }

    metrics::record_login("success");
    tracing::info!(client = %ip, "Session issued");

    let cookie = session::login_cookie(config.is_production(), config.auth.session_max_age_secs);
    Ok(with_cookie(
        Json(serde_json::json!({ "success": true })).into_response(),
        &cookie,
    ))
}

/// `POST /api/logout`. Always succeeds; only the client copy expires.
pub async fn logout(State(state): State<AppState>) -> Response {
    let config = state.config.load();
    let cookie = session::logout_cookie(config.is_production());
    with_cookie(
        Json(serde_json::json!({ "success": true })).into_response(),
        &cookie,
    )
}

/// `GET /api/auth/check`. Reports session state to the front end.
pub async fn check(headers: HeaderMap) -> Response {
    if session::is_authenticated(&headers) {
        Json(serde_json::json!({ "authenticated": true })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "authenticated": false })),
        )
            .into_response()
    }
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(_) => ApiError::ServerMisconfiguration.into_response(),
    }
}

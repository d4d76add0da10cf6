//! Request interception middleware.
//!
//! Single chokepoint executed before any route handler. Two independent
//! gates, both derived purely from the current request:
//!
//! 1. Write verbs on the protected idea collection require a valid session;
//!    failures short-circuit with 401 before the handler runs.
//! 2. Completed responses on non-asset paths get the baseline security
//!    header set.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;

use crate::auth::session;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers;

/// Path prefix whose mutating verbs require a session.
pub const PROTECTED_PREFIX: &str = "/api/ideas";

fn is_write(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PATCH | Method::DELETE)
}

/// Middleware entry point, installed on the whole router.
pub async fn intercept(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let config = state.config.load();

    // 1. Gate writes on the protected resource. The short-circuit response
    //    deliberately skips the hardening headers, matching the early return.
    if path.starts_with(PROTECTED_PREFIX)
        && is_write(&method)
        && !session::is_authenticated(request.headers())
    {
        tracing::warn!(method = %method, path = %path, "Unauthenticated write rejected");
        metrics::record_request(method.as_str(), StatusCode::UNAUTHORIZED.as_u16(), start);
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "unauthorized" })),
        )
            .into_response();
    }

    // 2. Run the handler, then harden everything that is not a static asset.
    let mut response = next.run(request).await;
    if !headers::is_asset_path(&path, &config.security.asset_prefixes) {
        headers::apply(response.headers_mut(), config.is_production());
    }

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

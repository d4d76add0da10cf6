//! HTTP API surface.
//!
//! # Routes
//! ```text
//! POST   /api/login       issue session cookie (login limiter first)
//! POST   /api/logout      clear session cookie
//! GET    /api/auth/check  report session state
//! GET    /api/ideas       list/search, public
//! POST   /api/ideas       create (gated + write-limited)
//! PATCH  /api/ideas?id=N  partial update (gated + write-limited)
//! DELETE /api/ideas?id=N  delete (gated + write-limited)
//! GET    /api/health      uncached health report
//! POST   /api/migrate     production-only storage provisioning
//! ```

pub mod auth;
pub mod error;
pub mod ideas;
pub mod ops;

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;

use crate::http::server::AppState;

pub use error::ApiError;

/// Assemble the API router.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check))
        .route(
            "/api/ideas",
            get(ideas::list)
                .post(ideas::create)
                .patch(ideas::update)
                .delete(ideas::remove),
        )
        .route("/api/health", get(ops::health))
        .route("/api/migrate", post(ops::migrate))
        .with_state(state)
}

/// Resolve the client IP used for limiter keys.
///
/// First entry of `X-Forwarded-For` wins, then the socket peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let peer: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, peer), "203.0.113.7");

        assert_eq!(client_ip(&HeaderMap::new(), peer), "127.0.0.1");

        let mut empty = HeaderMap::new();
        empty.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&empty, peer), "127.0.0.1");
    }
}

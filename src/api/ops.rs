//! Operational endpoints: health report and migration helper.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::api::error::ApiError;
use crate::auth::credentials;
use crate::http::server::AppState;

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    timestamp: String,
    uptime_secs: u64,
    environment: String,
    version: &'static str,
    checks: BTreeMap<&'static str, &'static str>,
    ideas: usize,
}

/// `GET /api/health`.
///
/// Reports overall status plus a per-check map. Responses are explicitly
/// uncacheable so load balancers always see fresh state.
pub async fn health(State(state): State<AppState>) -> Response {
    let config = state.config.load();

    let (store_check, status, code) = if !state.store.is_persistent() {
        ("ephemeral", "degraded", StatusCode::OK)
    } else {
        match state.store.probe() {
            Ok(()) => ("healthy", "healthy", StatusCode::OK),
            Err(e) => {
                tracing::error!(error = %e, "Store health check failed");
                ("unhealthy", "unhealthy", StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    };

    let mut checks = BTreeMap::new();
    checks.insert("store", store_check);

    let report = HealthReport {
        status,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        environment: config.environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
        checks,
        ideas: state.store.count(),
    };

    let mut response = (code, Json(report)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    response
}

/// `POST /api/migrate`.
///
/// Production-only storage provisioning helper, authenticated with the
/// admin password as a bearer token. Initializes the data file when it
/// does not exist yet.
pub async fn migrate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let config = state.config.load_full();

    if !config.is_production() {
        return Err(ApiError::Forbidden(
            "migrations can only be run in production".to_string(),
        ));
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    if config.auth.admin_password.is_empty() {
        return Err(ApiError::ServerMisconfiguration);
    }
    if !credentials::verify(token, &config.auth.admin_password) {
        return Err(ApiError::Unauthorized);
    }

    let already_provisioned = state.store.provision()?;
    let message = if already_provisioned {
        "storage already provisioned"
    } else {
        tracing::info!("Data file initialized");
        "data file initialized"
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "provisioned": already_provisioned,
        "message": message,
    })))
}

//! CRUD handlers for the idea collection.
//!
//! Write verbs arrive here only with a valid session (the interceptor has
//! already gated them); each write still consults the write limiter keyed
//! by `write:<client-ip>` before touching the store.

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::api::{client_ip, error::ApiError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::rate_limit::Decision;
use crate::store::{Idea, IdeaDraft, IdeaPatch};

#[derive(Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
    cursor: Option<u64>,
    q: Option<String>,
}

#[derive(Serialize)]
pub struct IdeaPage {
    ideas: Vec<Idea>,
    #[serde(rename = "nextCursor")]
    next_cursor: Option<u64>,
}

#[derive(Deserialize)]
pub struct IdParam {
    id: Option<u64>,
}

/// `GET /api/ideas` — public, read-only.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<IdeaPage> {
    let ideas = state
        .store
        .list(params.limit, params.cursor, params.q.as_deref());
    let next_cursor = ideas.last().map(|idea| idea.id);

    Json(IdeaPage { ideas, next_cursor })
}

/// `POST /api/ideas` — create.
pub async fn create(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    check_write_limit(&state, &headers, peer)?;

    let draft: IdeaDraft = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let draft = draft.normalize_and_validate().map_err(ApiError::InvalidInput)?;

    let idea = state.store.create(draft)?;
    tracing::debug!(id = idea.id, "Idea created");
    Ok((StatusCode::CREATED, Json(idea)).into_response())
}

/// `PATCH /api/ideas?id=N` — partial update.
pub async fn update(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<IdParam>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Idea>, ApiError> {
    check_write_limit(&state, &headers, peer)?;

    let id = params
        .id
        .ok_or_else(|| ApiError::InvalidInput("id required".to_string()))?;

    let patch: IdeaPatch = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    let patch = patch.normalize_and_validate().map_err(ApiError::InvalidInput)?;

    match state.store.update(id, patch)? {
        Some(idea) => {
            tracing::debug!(id, "Idea updated");
            Ok(Json(idea))
        }
        None => Err(ApiError::NotFound),
    }
}

/// `DELETE /api/ideas?id=N`.
pub async fn remove(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<IdParam>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    check_write_limit(&state, &headers, peer)?;

    let id = params
        .id
        .ok_or_else(|| ApiError::InvalidInput("id required".to_string()))?;

    if state.store.delete(id)? {
        tracing::debug!(id, "Idea deleted");
        Ok(Json(serde_json::json!({ "ok": true })))
    } else {
        Err(ApiError::NotFound)
    }
}

/// Consult the write limiter for this client; error short-circuits the write.
fn check_write_limit(
    state: &AppState,
    headers: &HeaderMap,
    peer: SocketAddr,
) -> Result<(), ApiError> {
    let ip = client_ip(headers, peer);
    let key = format!("write:{}", ip);

    match state.write_limiter.hit(&key) {
        Decision::Allowed { remaining } => {
            tracing::trace!(client = %ip, remaining, "Write allowed");
            Ok(())
        }
        Decision::Limited { retry_in } => {
            tracing::warn!(client = %ip, "Write ceiling exceeded");
            metrics::record_rate_limited("write");
            Err(ApiError::RateLimited { retry_in })
        }
    }
}

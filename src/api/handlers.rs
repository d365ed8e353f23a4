//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HasResponse, HealthResponse, KeysResponse, ResetResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The manager synchronises itself, so it is shared through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache manager
    pub cache: Arc<CacheManager>,
}

impl AppState {
    /// Creates a new AppState with the given cache manager.
    pub fn new(cache: CacheManager) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheManager::from_config(config))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair and registers the key.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set(&req.key, req.value.as_bytes())?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Strict lookup: a missing key answers 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.lookup(&key)?;

    Ok(Json(GetResponse::new(key, &value)))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let exists = state.cache.has(&key);
    Json(HasResponse::new(key, exists))
}

/// Handler for DELETE /del/:pattern
///
/// Deletes one key, or every registered key with the prefix when the
/// pattern ends with `*`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.cache.del(&pattern)?;

    Ok(Json(DeleteResponse::new(pattern, removed)))
}

/// Handler for POST /reset
pub async fn reset_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    state.cache.reset();
    Json(ResetResponse::done())
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse::new(state.cache.list_keys()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(&stats, state.cache.registered_len()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

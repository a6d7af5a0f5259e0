use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::admin::AdminState;
use crate::cache::CacheStats;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub routes: usize,
    pub cache_enabled: bool,
    pub cache_entries: usize,
}

#[derive(Serialize)]
pub struct CacheReport {
    pub success: bool,
    pub cache: CacheStats,
    pub timestamp: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
        routes: state.routes.len(),
        cache_enabled: state.cache.is_enabled(),
        cache_entries: state.cache.stats().size,
    })
}

pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheReport> {
    Json(CacheReport {
        success: true,
        cache: state.cache.stats(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn clear_cache(State(state): State<AdminState>) -> Json<Value> {
    let removed = state.cache.clear();
    Json(json!({
        "success": true,
        "message": "Cache invalidated",
        "keysCleared": removed,
    }))
}

pub async fn delete_cache_key(
    State(state): State<AdminState>,
    Path(key): Path<String>,
) -> (StatusCode, Json<Value>) {
    if state.cache.remove(&key) {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Cache key removed", "key": key })),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Cache key not found", "key": key })),
        )
    }
}

pub async fn invalidate_pattern(
    State(state): State<AdminState>,
    Path(pattern): Path<String>,
) -> Json<Value> {
    let removed = state.cache.invalidate(&pattern);
    Json(json!({
        "success": true,
        "pattern": pattern,
        "keysCleared": removed,
    }))
}

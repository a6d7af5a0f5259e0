//! Admin API.
//!
//! Served on the gateway listener under `/admin`, outside the proxy chain,
//! behind the client denylist and a bearer API key.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::cache::ResponseCache;
use crate::routing::RouteTable;

#[derive(Clone)]
pub struct AdminState {
    pub api_key: Arc<str>,
    pub cache: Arc<ResponseCache>,
    pub routes: Arc<RouteTable>,
    pub started_at: Instant,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache))
        .route("/admin/cache/clear", post(clear_cache))
        .route("/admin/cache/keys/{*key}", delete(delete_cache_key))
        .route("/admin/cache/invalidate/{*pattern}", post(invalidate_pattern))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

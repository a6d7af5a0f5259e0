//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub timestamp: String,
}

/// `GET /health`. Answers without touching the proxy chain.
pub async fn health_handler() -> Json<Liveness> {
    Json(Liveness {
        status: "UP",
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

/// Response payload for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Cluster status reported by the engine, or `unreachable`.
    pub engine_status: String,
    pub latency_ms: u128,
    pub message: String,
}

/// Never fails; an unhealthy engine yields `ok = false`.
pub async fn health_route(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let h = state.engine.health().await;
    let ok = matches!(h.status.as_str(), "green" | "yellow");
    let message = if ok {
        "search engine is reachable".to_string()
    } else {
        format!("search engine status: {}", h.status)
    };

    Json(HealthResponse {
        ok,
        engine_status: h.status,
        latency_ms: h.latency_ms,
        message,
    })
}

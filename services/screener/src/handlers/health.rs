//! Health endpoint - provider status plus metrics snapshot

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::observability::MetricsSnapshot;
use crate::AppState;
use market_data::SourceHealth;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: SourceHealth,
    pub metrics: MetricsSnapshot,
}

/// GET /health - service health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let source = state.source.health().await;
    let metrics = state.metrics.snapshot().await;

    // a provider with no traffic yet is still a healthy service
    let degraded = source.last_success.is_none() && source.last_error.is_some();

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source,
        metrics,
    })
}

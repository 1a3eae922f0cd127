//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Liveness summary.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub generation: u64,
    pub source: String,
    pub models: ModelTotals,
    pub sweep_running: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelTotals {
    pub configured: usize,
    pub available: usize,
    pub unavailable: usize,
    pub error: usize,
}

/// GET /health
///
/// `ok` when every configured model answered, `degraded` when some did,
/// `unconfigured` without models, `unhealthy` otherwise.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let counts = state.metrics_collector.model_counts();

    let status = match (counts.configured, counts.available) {
        (0, _) => "unconfigured",
        (c, a) if a == c => "ok",
        (_, a) if a > 0 => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        generation: state.session.generation(),
        source: state.session.source().to_string(),
        models: ModelTotals {
            configured: counts.configured,
            available: counts.available,
            unavailable: counts.unavailable,
            error: counts.error,
        },
        sweep_running: state.session.is_sweep_running(),
    })
}

//! Dashboard snapshot endpoint.

use crate::api::AppState;
use crate::dashboard::types::StatusSnapshot;
use crate::dashboard::view::build_snapshot;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /api/status - cards for every configured model plus sweep state.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(build_snapshot(&state.session))
}

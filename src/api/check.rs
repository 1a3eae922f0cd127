//! Manual sweep trigger.

use crate::api::{ApiError, AppState, CheckAccepted};
use crate::health::SweepError;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// POST /api/check
///
/// 202 when a sweep was started, 409 when one is already running or no
/// models are configured.
pub async fn handle(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    match state.checker.trigger() {
        Ok(()) => {
            let (config, generation) = state.session.current();
            tracing::info!(generation, "Manual sweep triggered");
            Ok((
                StatusCode::ACCEPTED,
                Json(CheckAccepted {
                    status: "accepted".to_string(),
                    generation,
                    models: config.model_count(),
                }),
            ))
        }
        Err(SweepError::AlreadyRunning) => {
            tracing::debug!("Manual trigger dropped, sweep already running");
            Err(ApiError::conflict(
                "sweep_in_progress",
                &SweepError::AlreadyRunning.to_string(),
            ))
        }
        Err(SweepError::NoModels) => Err(ApiError::conflict(
            "no_models",
            &SweepError::NoModels.to_string(),
        )),
    }
}

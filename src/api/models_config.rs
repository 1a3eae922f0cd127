//! Models config endpoints used by the dashboard's paste/upload panel.

use crate::api::{ApiError, AppState, ConfigReplaced, ConfigView};
use crate::catalog::{ConfigSource, ModelsConfig};
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /api/config - active models config with access tokens masked.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<ConfigView> {
    let (config, generation) = state.session.current();

    Json(ConfigView {
        source: state.session.source().to_string(),
        generation,
        models: config.masked(),
    })
}

/// PUT /api/config - replace the models config wholesale.
///
/// The document is validated before anything changes; on success it is
/// persisted (when enabled) and a fresh sweep is scheduled.
pub async fn put(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ConfigReplaced>, ApiError> {
    let config = ModelsConfig::from_json(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected models config");
        ApiError::bad_request(&format!("Invalid models config: {}", e))
    })?;

    let persisted = if state.config.storage.persist {
        match state.store.save(&config).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist models config");
                false
            }
        }
    } else {
        false
    };

    let providers = config.provider_count();
    let models = config.model_count();
    let generation = state.checker.reload(config, ConfigSource::Uploaded);

    Ok(Json(ConfigReplaced {
        providers,
        models,
        generation,
        persisted,
    }))
}

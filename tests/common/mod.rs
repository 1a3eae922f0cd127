//! Shared helpers for llm-pulse integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use pulse::api::{create_router, AppState};
use pulse::catalog::{ConfigSource, MemoryConfigStore, ModelsConfig};
use pulse::config::PulseConfig;
use std::sync::Arc;

/// Server config with short probe timings and no persistence.
pub fn test_config() -> PulseConfig {
    let mut config = PulseConfig::default();
    config.health_check.timeout_ms = 2_000;
    config.health_check.pause_ms = 10;
    config.storage.persist = false;
    config.storage.models_file = None;
    config
}

/// App state holding `models` as the active config.
pub fn test_state(models: ModelsConfig) -> Arc<AppState> {
    test_state_with(test_config(), models)
}

pub fn test_state_with(config: PulseConfig, models: ModelsConfig) -> Arc<AppState> {
    let state = Arc::new(AppState::new(
        Arc::new(config),
        Arc::new(MemoryConfigStore::default()),
    ));
    if !models.is_empty() {
        state.session.replace_config(models, ConfigSource::Uploaded);
    }
    state
}

/// Models JSON with one provider pointing every model at `uri`.
pub fn models_json(provider: &str, models: &[&str], uri: &str) -> String {
    let entries: Vec<String> = models
        .iter()
        .map(|m| {
            format!(
                r#""{m}": {{"url": "{uri}", "model": "{m}", "access_token": "token-{m}"}}"#
            )
        })
        .collect();
    format!(r#"{{"{}": {{{}}}}}"#, provider, entries.join(", "))
}

pub fn models_for(provider: &str, models: &[&str], uri: &str) -> ModelsConfig {
    ModelsConfig::from_json(&models_json(provider, models, uri)).unwrap()
}

pub fn app(state: Arc<AppState>) -> axum::Router {
    create_router(state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Poll until the session has stamped a completed sweep.
pub async fn wait_for_sweep(state: &AppState) {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while state.session.last_updated().is_none() {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("sweep did not finish");
}

//! Integration tests for the sweep runner against mock upstreams.

use pulse::catalog::{ConfigSource, ModelEndpoint, ModelsConfig};
use pulse::health::{HealthCheckConfig, HealthChecker, MonitorSession, ProbeStatus, SweepError};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> HealthCheckConfig {
    HealthCheckConfig {
        timeout_ms: 300,
        pause_ms: 10,
        ..Default::default()
    }
}

/// Upstream whose answer depends on the probed model name.
async fn mixed_upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "up"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"model": "down"})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"model": "slow"})))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_mixed_sweep_classifies_each_model() {
    let server = mixed_upstream().await;
    let uri = server.uri();
    let models = ModelsConfig::new()
        .with_model("P", "up", ModelEndpoint::new(&uri, "up", "t"))
        .with_model("P", "down", ModelEndpoint::new(&uri, "down", "t"))
        .with_model("Q", "slow", ModelEndpoint::new(&uri, "slow", "t"));

    let session = Arc::new(MonitorSession::with_config(models, ConfigSource::Uploaded));
    let checker = HealthChecker::new(Arc::clone(&session), config());

    let results = checker.check_all_models().await.unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0].result.status, ProbeStatus::Available);
    assert!(results[0].result.latency_ms.is_some());

    assert_eq!(results[1].result.status, ProbeStatus::Unavailable);
    assert_eq!(results[1].result.error_message().as_deref(), Some("HTTP 503"));

    assert_eq!(results[2].result.status, ProbeStatus::Error);
    assert!(results[2].result.error_message().unwrap().contains("timeout"));

    // Timeouts and HTTP statuses never raise the notice.
    assert!(!session.network_notice());
    assert!(session.last_updated().is_some());
}

#[tokio::test]
async fn test_empty_session_has_nothing_to_check() {
    let session = Arc::new(MonitorSession::new());
    let checker = Arc::new(HealthChecker::new(session, config()));

    assert_eq!(checker.trigger(), Err(SweepError::NoModels));
    assert!(checker.check_all_models().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_increments_on_each_reload() {
    let session = Arc::new(MonitorSession::new());
    let checker = HealthChecker::new(Arc::clone(&session), config());
    assert_eq!(session.generation(), 0);

    let first = checker.reload(ModelsConfig::new(), ConfigSource::Uploaded);
    let second = checker.reload(ModelsConfig::new(), ConfigSource::Uploaded);
    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(session.source(), ConfigSource::Uploaded);
}

//! Integration tests for the dashboard routes and its live update stream.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use pulse::catalog::ModelsConfig;
use pulse::dashboard::types::{StatusSnapshot, UpdateType};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn initial_data(html: &str) -> StatusSnapshot {
    let start_tag = r#"<script id="initial-data" type="application/json">"#;
    let start = html.find(start_tag).unwrap() + start_tag.len();
    let end = start + html[start..].find("</script>").unwrap();
    serde_json::from_str(html[start..end].trim()).unwrap()
}

#[tokio::test]
async fn test_dashboard_endpoint_returns_html_with_snapshot() {
    let state = test_state(models_for("Provider A", &["alpha", "beta"], "https://a.example"));
    let mut app = app(state);

    let response = app.call(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.contains("text/html"));

    let html = body_string(response).await;
    let snapshot = initial_data(&html);
    assert_eq!(snapshot.providers.len(), 1);
    assert_eq!(snapshot.providers[0].name, "Provider A");
    assert_eq!(snapshot.providers[0].cards[1].model, "beta");
    assert!(!html.contains("token-alpha"));
}

#[tokio::test]
async fn test_dashboard_empty_config_still_renders() {
    let mut app = app(test_state(ModelsConfig::new()));

    let html = body_string(app.call(get("/")).await.unwrap()).await;
    let snapshot = initial_data(&html);
    assert!(snapshot.providers.is_empty());
    assert_eq!(snapshot.source, "empty");
}

#[tokio::test]
async fn test_assets_endpoint_serves_embedded_files() {
    let mut app = app(test_state(ModelsConfig::new()));

    let css = app.call(get("/assets/styles.css")).await.unwrap();
    assert_eq!(css.status(), StatusCode::OK);
    assert!(css.headers()["content-type"].to_str().unwrap().contains("css"));

    let js = app.call(get("/assets/dashboard.js")).await.unwrap();
    assert_eq!(js.status(), StatusCode::OK);

    let missing = app.call(get("/assets/missing.js")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_websocket_endpoint_accepts_upgrade() {
    let mut app = app(test_state(ModelsConfig::new()));

    let request = Request::builder()
        .uri("/ws")
        .header("Upgrade", "websocket")
        .header("Connection", "Upgrade")
        .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
        .header("Sec-WebSocket-Version", "13")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    // Without a real connection hyper cannot complete the upgrade.
    assert!(
        response.status() == StatusCode::SWITCHING_PROTOCOLS
            || response.status() == StatusCode::UPGRADE_REQUIRED
            || response.status() == StatusCode::OK,
        "Expected WebSocket upgrade response, got: {}",
        response.status()
    );
}

#[tokio::test]
async fn test_sweep_broadcasts_card_updates() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&upstream)
        .await;

    let state = test_state(models_for("P", &["m1"], &upstream.uri()));
    let mut rx = state.ws_broadcast.subscribe();

    state.checker.trigger().unwrap();
    wait_for_sweep(&state).await;

    let mut updates = Vec::new();
    while let Ok(Ok(update)) =
        tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
    {
        updates.push(update);
    }

    let kinds: Vec<_> = updates.iter().map(|u| u.update_type.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            UpdateType::ProbeStarted,
            UpdateType::ProbeResult,
            UpdateType::SweepComplete
        ]
    );

    assert_eq!(updates[0].data["card"]["status_text"], "⏳ Checking...");
    assert_eq!(updates[1].data["card"]["status_text"], "🔴 Unavailable");
    assert_eq!(updates[1].data["card"]["latency_text"], "Error 429");
    assert_eq!(updates[1].data["result"]["error"], "HTTP 429");
    assert_eq!(updates[2].data["models_checked"], 1);
}

#[tokio::test]
async fn test_network_notice_broadcast_once() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let refused = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let state = test_state(models_for("P", &["a", "b", "c"], &refused));
    let mut rx = state.ws_broadcast.subscribe();

    state.checker.trigger().unwrap();
    wait_for_sweep(&state).await;

    let mut notices = 0;
    while let Ok(Ok(update)) =
        tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
    {
        if update.update_type == UpdateType::NetworkNotice {
            notices += 1;
        }
    }
    assert_eq!(notices, 1);

    let mut app = app(Arc::clone(&state));
    let status = body_json(app.call(get("/api/status")).await.unwrap()).await;
    assert_eq!(status["network_notice"], true);
    assert_eq!(status["providers"][0]["cards"][0]["latency_text"], "Network error");
    assert_eq!(status["providers"][0]["cards"][0]["status_text"], "🔴 Error");
}

#[tokio::test]
async fn test_config_reload_broadcasts_and_resets() {
    let state = test_state(models_for("Old", &["o1"], "https://old"));
    let mut rx = state.ws_broadcast.subscribe();
    let mut app = app(Arc::clone(&state));

    let response = app
        .call(request(
            "PUT",
            "/api/config",
            models_json("New", &["n1"], "https://new"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let update = rx.recv().await.unwrap();
    assert_eq!(update.update_type, UpdateType::ConfigReloaded);
    assert_eq!(update.data["models"], 1);
    assert_eq!(update.data["generation"], state.session.generation());
}

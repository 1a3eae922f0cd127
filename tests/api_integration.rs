//! Integration tests for the JSON API.
//!
//! Each test drives the router directly with `tower::Service::call` and
//! points probes at a wiremock upstream.

mod common;

use axum::http::StatusCode;
use common::*;
use pulse::catalog::{ConfigStore, MemoryConfigStore, ModelsConfig};
use pulse::api::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower::Service;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn ok_upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_health_unconfigured() {
    let mut app = app(test_state(ModelsConfig::new()));

    let response = app.call(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "unconfigured");
    assert_eq!(json["models"]["configured"], 0);
    assert_eq!(json["sweep_running"], false);
}

#[tokio::test]
async fn test_router_returns_404_unknown() {
    let mut app = app(test_state(ModelsConfig::new()));
    let response = app.call(get("/v1/unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_lists_cards_in_config_order() {
    let models = ModelsConfig::from_json(
        r#"{
            "Zed": {"z1": {"url": "https://z", "model": "z1", "access_token": "t"}},
            "Abc": {"b2": {"url": "https://b", "model": "b2", "access_token": "t"},
                    "b1": {"url": "https://b", "model": "b1", "access_token": "t"}}
        }"#,
    )
    .unwrap();
    let mut app = app(test_state(models));

    let json = body_json(app.call(get("/api/status")).await.unwrap()).await;
    let providers = json["providers"].as_array().unwrap();
    assert_eq!(providers[0]["name"], "Zed");
    assert_eq!(providers[1]["name"], "Abc");
    assert_eq!(providers[1]["cards"][0]["model"], "b2");
    assert_eq!(providers[1]["cards"][1]["model"], "b1");
    assert_eq!(providers[0]["cards"][0]["latency_text"], "—");
    assert!(json["last_updated"].is_null());
}

#[tokio::test]
async fn test_check_without_models_is_conflict() {
    let mut app = app(test_state(ModelsConfig::new()));

    let response = app
        .call(request("POST", "/api/check", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "no_models");
}

#[tokio::test]
async fn test_check_runs_sweep_and_updates_status() {
    let server = ok_upstream().await;
    let state = test_state(models_for("P", &["m1", "m2"], &server.uri()));
    let mut app = app(Arc::clone(&state));

    let response = app
        .call(request("POST", "/api/check", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "accepted");
    assert_eq!(json["models"], 2);

    wait_for_sweep(&state).await;

    let json = body_json(app.call(get("/api/status")).await.unwrap()).await;
    let cards = json["providers"][0]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    for card in cards {
        assert_eq!(card["status_text"], "🟢 Available");
        assert!(card["latency_text"].as_str().unwrap().ends_with(" ms"));
    }
    assert!(json["last_updated"].is_string());

    let health = body_json(app.call(get("/health")).await.unwrap()).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["models"]["available"], 2);
}

#[tokio::test]
async fn test_overlapping_check_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let state = test_state(models_for("P", &["m1"], &server.uri()));
    let mut app = app(Arc::clone(&state));

    let first = app.call(request("POST", "/api/check", "")).await.unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = app.call(request("POST", "/api/check", "")).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["error"]["code"], "sweep_in_progress");

    wait_for_sweep(&state).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_single_model_sweep_hits_endpoint_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let json = format!(
        r#"{{"P":{{"m1":{{"url":"{}","model":"m1","access_token":"k"}}}}}}"#,
        server.uri()
    );
    let state = test_state(ModelsConfig::from_json(&json).unwrap());
    let mut app = app(Arc::clone(&state));

    let response = app.call(request("POST", "/api/check", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_sweep(&state).await;
}

#[tokio::test]
async fn test_get_config_masks_tokens() {
    let models = ModelsConfig::from_json(
        r#"{"P": {"m1": {"url": "https://x", "model": "m1", "access_token": "sk-very-secret-1234"}}}"#,
    )
    .unwrap();
    let mut app = app(test_state(models));

    let response = app.call(get("/api/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(!body.contains("sk-very-secret"));
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["source"], "uploaded");
    assert_eq!(json["models"]["P"]["m1"]["access_token"], "***************1234");
    assert_eq!(json["models"]["P"]["m1"]["url"], "https://x");
}

#[tokio::test]
async fn test_put_config_malformed_is_bad_request() {
    let state = test_state(models_for("Keep", &["k1"], "https://keep"));
    let generation = state.session.generation();
    let mut app = app(Arc::clone(&state));

    let response = app
        .call(request("PUT", "/api/config", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid models config"));
    assert_eq!(state.session.generation(), generation);
}

#[tokio::test]
async fn test_put_config_wrong_shape_is_bad_request() {
    let mut app = app(test_state(ModelsConfig::new()));

    let response = app
        .call(request("PUT", "/api/config", r#"{"P": {"m1": {"url": 5}}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_config_replaces_and_bumps_generation() {
    let state = test_state(models_for("Old", &["o1"], "https://old"));
    let before = state.session.generation();
    let mut app = app(Arc::clone(&state));

    let response = app
        .call(request(
            "PUT",
            "/api/config",
            models_json("New", &["n1", "n2"], "https://new"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["providers"], 1);
    assert_eq!(json["models"], 2);
    assert_eq!(json["persisted"], false);
    assert_eq!(json["generation"], before + 1);

    let status = body_json(app.call(get("/api/status")).await.unwrap()).await;
    assert_eq!(status["providers"][0]["name"], "New");
    assert_eq!(status["source"], "uploaded");
    assert_eq!(status["network_notice"], false);
}

#[tokio::test]
async fn test_put_config_persists_through_store() {
    let mut config = test_config();
    config.storage.persist = true;
    let store = Arc::new(MemoryConfigStore::default());
    let state = Arc::new(AppState::new(Arc::new(config), store.clone()));
    let mut app = app(state);

    let response = app
        .call(request(
            "PUT",
            "/api/config",
            models_json("Saved", &["s1"], "https://saved"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["persisted"], true);

    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved.providers()[0].name, "Saved");
    assert_eq!(saved.get("Saved", "s1").unwrap().access_token, "token-s1");
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_text() {
    let mut app = app(test_state(ModelsConfig::new()));

    let response = app.call(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_get_config_keeps_document_order() {
    let models = ModelsConfig::from_json(
        r#"{"Zed": {"z1": {"url": "https://z", "model": "z1", "access_token": "t"}},
            "Abc": {"a1": {"url": "https://a", "model": "a1", "access_token": "t"}}}"#,
    )
    .unwrap();
    let mut app = app(test_state(models));

    let body = body_string(app.call(get("/api/config")).await.unwrap()).await;
    let zed = body.find("\"Zed\"").unwrap();
    let abc = body.find("\"Abc\"").unwrap();
    assert!(zed < abc);
}

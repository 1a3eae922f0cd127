//! Same-origin relay.
//!
//! `POST /relay` with `{targetUrl, body, headers}` forwards `body` as a JSON
//! POST to `targetUrl` and mirrors the upstream status and payload. Every
//! response, including the `OPTIONS` preflight and the 405 for other
//! methods, carries permissive CORS headers.
//!
//! | Request | Response |
//! |---|---|
//! | `OPTIONS` | 200, empty body |
//! | `POST` without `targetUrl` | 400 `{"error":"targetUrl is required"}` |
//! | `POST` | upstream status, upstream JSON (or its text as a JSON string) |
//! | `POST`, internal failure | 500 `{"error":"Proxy error","message":...}` |
//! | `POST`, body over `server.max_body_bytes` | 413 `{"error":"Request body too large"}` |
//! | anything else | 405 `{"error":"Method not allowed"}` |

mod error;

pub use error::RelayError;

use crate::api::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Headers attached to every relay response.
pub const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Authorization",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
    (header::CONTENT_TYPE, "application/json"),
];

/// Body of a relay call.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayRequest {
    #[serde(rename = "targetUrl", default)]
    pub target_url: Option<String>,
    /// Forwarded JSON-encoded; a missing or null body sends none
    #[serde(default)]
    pub body: Option<Value>,
    /// Merged over `Content-Type: application/json`
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Status and JSON payload to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Parse a raw relay request and forward it.
///
/// A missing `targetUrl` is a normal 400 answer, not an error.
pub async fn forward(client: &reqwest::Client, raw: &[u8]) -> Result<RelayResponse, RelayError> {
    let request: RelayRequest = serde_json::from_slice(raw)?;

    let target = match request.target_url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Ok(RelayResponse {
                status: StatusCode::BAD_REQUEST,
                body: json!({ "error": "targetUrl is required" }),
            })
        }
    };

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    for (name, value) in &request.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| RelayError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    let mut upstream = client.post(target).headers(headers);
    if let Some(body) = &request.body {
        upstream = upstream.body(serde_json::to_vec(body)?);
    }

    let response = upstream.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Ok(RelayResponse { status, body })
}

/// Relay endpoint handler for every method on `/relay`.
pub async fn handle(State(state): State<Arc<AppState>>, method: Method, body: Body) -> Response {
    if method == Method::OPTIONS {
        return with_cors((StatusCode::OK, "").into_response());
    }
    if method != Method::POST {
        return json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "error": "Method not allowed" }),
        );
    }

    let request_id = crate::logging::generate_request_id();
    let response = match axum::body::to_bytes(body, state.config.server.max_body_bytes).await {
        Ok(raw) => relay_with_logging(&state.http_client, &raw, &request_id).await,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Relay body rejected");
            json_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                &json!({ "error": "Request body too large" }),
            )
        }
    };

    metrics::counter!("pulse_relay_requests_total",
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}

async fn relay_with_logging(client: &reqwest::Client, raw: &[u8], request_id: &str) -> Response {
    match forward(client, raw).await {
        Ok(relayed) => {
            tracing::info!(
                request_id = %request_id,
                status = relayed.status.as_u16(),
                "Relayed request"
            );
            json_response(relayed.status, &relayed.body)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Proxy error");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": "Proxy error", "message": e.to_string() }),
            )
        }
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response {
    with_cors((status, body.to_string()).into_response())
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}

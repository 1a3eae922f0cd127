//! HTTP handlers for dashboard routes

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::RustEmbed;
use std::sync::Arc;

use crate::api::AppState;
use crate::dashboard::view::build_snapshot;

/// Placeholder in `index.html` replaced with the initial snapshot
const INITIAL_DATA_PLACEHOLDER: &str = r#"<script id="initial-data" type="application/json">
        {}
    </script>"#;

/// Embedded dashboard assets from dashboard/ directory
#[derive(RustEmbed)]
#[folder = "dashboard/"]
struct DashboardAssets;

/// Serves the main dashboard HTML page with injected initial data
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Response {
    match DashboardAssets::get("index.html") {
        Some(content) => {
            let body = content.data;
            let html = match std::str::from_utf8(&body) {
                Ok(html) => html,
                Err(_) => {
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid HTML encoding")
                        .into_response()
                }
            };

            let snapshot = build_snapshot(&state.session);
            let snapshot_json =
                serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string());
            // Keep the payload from closing the script element early.
            let snapshot_json = snapshot_json.replace("</", "<\\/");

            let updated_html = html.replace(
                INITIAL_DATA_PLACEHOLDER,
                &format!(
                    r#"<script id="initial-data" type="application/json">
        {}
    </script>"#,
                    snapshot_json
                ),
            );

            Html(updated_html).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Dashboard HTML not found",
        )
            .into_response(),
    }
}

/// Serves static assets (CSS, JS, etc.)
pub async fn assets_handler(Path(path): Path<String>) -> Response {
    match DashboardAssets::get(&path) {
        Some(content) => {
            let body = content.data;
            let mime_type = mime_guess::from_path(&path).first_or_octet_stream();

            ([(header::CONTENT_TYPE, mime_type.as_ref())], body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Asset not found").into_response(),
    }
}

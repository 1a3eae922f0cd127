//! # HTTP API
//!
//! Router and shared state for the pulse server.
//!
//! ## Endpoints
//!
//! - `GET /` - Dashboard page with the initial snapshot injected
//! - `GET /assets/{path}` - Dashboard static assets
//! - `GET /ws` - WebSocket stream of probe events
//! - `GET /api/status` - Snapshot of every model card
//! - `POST /api/check` - Manual sweep trigger
//! - `GET /api/config` / `PUT /api/config` - Read (masked) or replace the models config
//! - `* /relay` - Same-origin relay
//! - `GET /health` - Liveness summary
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use pulse::api::{create_router, AppState};
//! use pulse::catalog::MemoryConfigStore;
//! use pulse::config::PulseConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(PulseConfig::default());
//! let state = Arc::new(AppState::new(config, Arc::new(MemoryConfigStore::default())));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod check;
mod health;
mod models_config;
mod status;
pub mod types;

pub use types::*;

use crate::catalog::ConfigStore;
use crate::config::PulseConfig;
use crate::dashboard::types::WebSocketUpdate;
use crate::health::{HealthChecker, MonitorSession};
use crate::metrics::MetricsCollector;
use axum::{
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Capacity of the dashboard update channel.
const WS_CHANNEL_CAPACITY: usize = 1000;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<PulseConfig>,
    pub session: Arc<MonitorSession>,
    pub checker: Arc<HealthChecker>,
    pub store: Arc<dyn ConfigStore>,
    /// Client for relayed requests
    pub http_client: reqwest::Client,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Dashboard update fan-out
    pub ws_broadcast: broadcast::Sender<WebSocketUpdate>,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state with an empty session.
    pub fn new(config: Arc<PulseConfig>, store: Arc<dyn ConfigStore>) -> Self {
        let session = Arc::new(MonitorSession::new());
        let (ws_broadcast, _) = broadcast::channel(WS_CHANNEL_CAPACITY);

        let checker = Arc::new(
            HealthChecker::new(Arc::clone(&session), config.health_check.clone())
                .with_broadcast(ws_broadcast.clone()),
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.request_timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default relay client");
                reqwest::Client::new()
            });

        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&session),
            start_time,
            crate::metrics::setup_metrics_or_detached(),
        ));

        Self {
            config,
            session,
            checker,
            store,
            http_client,
            start_time,
            ws_broadcast,
            metrics_collector,
        }
    }
}

/// Create the main router with all endpoints configured.
///
/// `/relay` enforces the body limit itself so that its 413 carries the same
/// CORS headers as every other relay answer.
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let routes = Router::new()
        .route("/", get(crate::dashboard::dashboard_handler))
        .route("/assets/*path", get(crate::dashboard::assets_handler))
        .route("/ws", get(crate::dashboard::websocket_handler))
        .route("/api/status", get(status::handle))
        .route("/api/check", post(check::handle))
        .route(
            "/api/config",
            get(models_config::get).put(models_config::put),
        )
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(max_body));

    Router::new()
        .route("/relay", any(crate::relay::handle))
        .merge(routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

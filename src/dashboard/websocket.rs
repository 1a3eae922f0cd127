//! WebSocket handler for real-time dashboard updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::api::AppState;
use crate::dashboard::types::{ModelCard, UpdateType, WebSocketUpdate};
use crate::health::ProbeResult;

/// Largest message forwarded to a client
const MAX_MESSAGE_BYTES: usize = 10 * 1024;

/// Handles WebSocket upgrade requests for dashboard real-time updates
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast channel
    let mut rx = state.ws_broadcast.subscribe();

    // Spawn task to forward broadcast messages to WebSocket
    let send_task = tokio::spawn(async move {
        loop {
            let update = match rx.recv().await {
                Ok(update) => update,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Dashboard client lagging, dropped updates");
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            };

            match serde_json::to_string(&update) {
                Ok(json) => {
                    if json.len() > MAX_MESSAGE_BYTES {
                        tracing::warn!(
                            "WebSocket message exceeds 10KB limit ({}B), skipping",
                            json.len()
                        );
                        continue;
                    }

                    if (sender.send(Message::Text(json)).await).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket update: {}", e);
                }
            }
        }
    });

    // Handle incoming messages (ping/pong, close)
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

/// Create a probe started update message
pub fn create_probe_started_update(generation: u64, card: ModelCard) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::ProbeStarted,
        data: serde_json::json!({
            "generation": generation,
            "card": card,
        }),
    }
}

/// Create a probe result update message
pub fn create_probe_result_update(
    generation: u64,
    result: &ProbeResult,
    card: ModelCard,
) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::ProbeResult,
        data: serde_json::json!({
            "generation": generation,
            "result": result,
            "card": card,
        }),
    }
}

/// Create a sweep complete update message
pub fn create_sweep_complete_update(
    generation: u64,
    completed_at: DateTime<Utc>,
    models_checked: usize,
) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::SweepComplete,
        data: serde_json::json!({
            "generation": generation,
            "completed_at": completed_at,
            "models_checked": models_checked,
        }),
    }
}

/// Create the one-time network notice message
pub fn create_network_notice_update(error: String) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::NetworkNotice,
        data: serde_json::json!({ "error": error }),
    }
}

/// Create a config reloaded update message
pub fn create_config_reloaded_update(
    generation: u64,
    providers: usize,
    models: usize,
) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::ConfigReloaded,
        data: serde_json::json!({
            "generation": generation,
            "providers": providers,
            "models": models,
        }),
    }
}

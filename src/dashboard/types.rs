//! Type definitions for dashboard data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WebSocket update message sent to dashboard clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketUpdate {
    /// Type of update
    pub update_type: UpdateType,
    /// JSON payload for the update
    pub data: serde_json::Value,
}

/// Type of WebSocket update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UpdateType {
    /// A probe was issued; the card shows the checking state
    ProbeStarted,
    /// A probe finished
    ProbeResult,
    /// Every model of the sweep was probed
    SweepComplete,
    /// Sticky notice that endpoints look unreachable from this host
    NetworkNotice,
    /// The models config was replaced
    ConfigReloaded,
}

/// Display model for one model card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCard {
    pub provider: String,
    pub model: String,
    pub url: String,
    pub status_text: String,
    pub status_class: String,
    pub latency_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

/// Cards of one provider, in config order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSection {
    pub name: String,
    pub cards: Vec<ModelCard>,
}

/// Everything the dashboard needs to draw itself from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub generation: u64,
    pub source: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub sweep_running: bool,
    pub network_notice: bool,
    pub providers: Vec<ProviderSection>,
}

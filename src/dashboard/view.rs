//! Pure mapping from probe state to what a card displays.

use super::types::{ModelCard, ProviderSection, StatusSnapshot};
use crate::catalog::ModelEndpoint;
use crate::health::{HealthCheckError, MonitorSession, ProbeResult, ProbeStatus, SlotState};

/// Placeholder shown before any value is known.
pub const PLACEHOLDER: &str = "—";

/// Build the card for one model from its slot state.
pub fn render_card(
    provider: &str,
    model: &str,
    endpoint: &ModelEndpoint,
    slot: &SlotState,
) -> ModelCard {
    let (status_text, status_class, latency_text, checked_at) = match slot {
        SlotState::Pending => (PLACEHOLDER, "status", PLACEHOLDER.to_string(), None),
        SlotState::Checking => (
            "⏳ Checking...",
            "status checking",
            PLACEHOLDER.to_string(),
            None,
        ),
        SlotState::Checked { result, checked_at } => {
            let latency = latency_text(result);
            let (text, class) = match result.status {
                ProbeStatus::Available => ("🟢 Available", "status available"),
                ProbeStatus::Unavailable => ("🔴 Unavailable", "status unavailable"),
                ProbeStatus::Error => ("🔴 Error", "status error"),
            };
            (text, class, latency, Some(*checked_at))
        }
    };

    ModelCard {
        provider: provider.to_string(),
        model: model.to_string(),
        url: endpoint.url.clone(),
        status_text: status_text.to_string(),
        status_class: status_class.to_string(),
        latency_text,
        checked_at,
    }
}

/// Latency column text: `<n> ms`, `Error <code>`, `Timeout` or `Network error`.
pub fn latency_text(result: &ProbeResult) -> String {
    match (result.status, &result.error) {
        (ProbeStatus::Available, _) => match result.latency_ms {
            Some(ms) => format!("{} ms", ms),
            None => PLACEHOLDER.to_string(),
        },
        (_, Some(HealthCheckError::HttpError(code))) => format!("Error {}", code),
        (_, Some(HealthCheckError::Timeout(_))) => "Timeout".to_string(),
        _ => "Network error".to_string(),
    }
}

/// Snapshot of every card in config order.
pub fn build_snapshot(session: &MonitorSession) -> StatusSnapshot {
    let (config, generation) = session.current();

    let providers = config
        .providers()
        .iter()
        .map(|provider| ProviderSection {
            name: provider.name.clone(),
            cards: provider
                .models
                .iter()
                .map(|m| {
                    let slot = session.slot(&provider.name, &m.name);
                    render_card(&provider.name, &m.name, &m.endpoint, &slot)
                })
                .collect(),
        })
        .collect();

    StatusSnapshot {
        generation,
        source: session.source().to_string(),
        last_updated: session.last_updated(),
        sweep_running: session.is_sweep_running(),
        network_notice: session.network_notice(),
        providers,
    }
}

//! # Metrics
//!
//! Prometheus export of probe outcomes, exposed at `GET /metrics`.
//!
//! **Counters:**
//! - `pulse_probes_total{provider, model, status}` - Probes by outcome
//! - `pulse_sweeps_total` - Sweeps that finished on a current config
//! - `pulse_relay_requests_total{status}` - Relay responses by status
//!
//! **Histograms:**
//! - `pulse_probe_latency_seconds{provider, model}` - Latency of available probes
//!
//! **Gauges** (computed at scrape time):
//! - `pulse_models_configured` - Models in the active config
//! - `pulse_models_available` - Models whose last probe was available
//! - `pulse_config_generation` - Active config generation
//! - `pulse_uptime_seconds` - Seconds since startup

pub mod handler;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::{MonitorSession, ProbeStatus, SlotState};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Derives scrape-time gauges from the session and renders the exporter.
pub struct MetricsCollector {
    session: Arc<MonitorSession>,
    start_time: Instant,
    prometheus_handle: PrometheusHandle,
}

/// Per-status tally of the active config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelCounts {
    pub configured: usize,
    pub available: usize,
    pub unavailable: usize,
    pub error: usize,
    pub pending: usize,
}

impl MetricsCollector {
    pub fn new(
        session: Arc<MonitorSession>,
        start_time: Instant,
        prometheus_handle: PrometheusHandle,
    ) -> Self {
        Self {
            session,
            start_time,
            prometheus_handle,
        }
    }

    /// Count the active config's models by their latest outcome.
    pub fn model_counts(&self) -> ModelCounts {
        let (config, _) = self.session.current();
        let mut counts = ModelCounts::default();

        for (provider, model) in config.entries() {
            counts.configured += 1;
            match self.session.slot(provider, &model.name) {
                SlotState::Checked { result, .. } => match result.status {
                    ProbeStatus::Available => counts.available += 1,
                    ProbeStatus::Unavailable => counts.unavailable += 1,
                    ProbeStatus::Error => counts.error += 1,
                },
                SlotState::Pending | SlotState::Checking => counts.pending += 1,
            }
        }

        counts
    }

    /// Refresh gauges that mirror session state.
    pub fn update_gauges(&self) {
        let counts = self.model_counts();
        metrics::gauge!("pulse_models_configured").set(counts.configured as f64);
        metrics::gauge!("pulse_models_available").set(counts.available as f64);
        metrics::gauge!("pulse_config_generation").set(self.session.generation() as f64);
        metrics::gauge!("pulse_uptime_seconds").set(self.uptime_seconds() as f64);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Probe latency buckets span fast local endpoints up to the 10 s probe
/// deadline.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let latency_buckets = &[
        0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.5, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("pulse_probe_latency_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the global recorder, or build a detached handle if one is
/// already installed (several app states in one test process).
pub fn setup_metrics_or_detached() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}

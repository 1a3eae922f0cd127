//! Probe outcomes and per-model slot state.

use super::error::HealthCheckError;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Classified outcome of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Available,
    Unavailable,
    Error,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProbeStatus::Available => "available",
            ProbeStatus::Unavailable => "unavailable",
            ProbeStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Result of probing one model endpoint.
///
/// `latency_ms` is only present for available endpoints; `error` is absent
/// for them and present otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<HealthCheckError>,
}

impl ProbeResult {
    pub fn available(latency_ms: u64) -> Self {
        Self {
            status: ProbeStatus::Available,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    /// Classify a failure: HTTP statuses are `unavailable`, everything else `error`.
    pub fn failed(error: HealthCheckError) -> Self {
        let status = match error {
            HealthCheckError::HttpError(_) => ProbeStatus::Unavailable,
            _ => ProbeStatus::Error,
        };
        Self {
            status,
            latency_ms: None,
            error: Some(error),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<HealthCheckError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Where a model stands in the current config generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotState {
    /// Not probed yet
    #[default]
    Pending,
    /// Probe in flight
    Checking,
    /// Last probe finished
    Checked {
        result: ProbeResult,
        checked_at: DateTime<Utc>,
    },
}

/// One row of a sweep's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepEntry {
    pub provider: String,
    pub model: String,
    pub result: ProbeResult,
}

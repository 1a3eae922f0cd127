//! Configuration for health checking.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for model endpoint probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether the periodic timer is enabled (manual triggers always work)
    pub enabled: bool,
    /// Seconds between scheduled sweeps
    pub interval_seconds: u64,
    /// Deadline for a single probe
    pub timeout_ms: u64,
    /// Pause after each probe before the next one starts
    pub pause_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            timeout_ms: 10_000,
            pause_ms: 200,
        }
    }
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

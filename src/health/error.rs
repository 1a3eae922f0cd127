//! Error types for health checking.

use thiserror::Error;

/// Ways a single probe can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthCheckError {
    /// Endpoint answered with a non-ok status
    #[error("HTTP {0}")]
    HttpError(u16),

    /// Probe exceeded its deadline and was aborted
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Generic connection failure (refused, DNS, TLS, reset)
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other transport failure, e.g. an unusable URL
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl HealthCheckError {
    /// Whether this failure has the shape of a blocked network path.
    ///
    /// Only generic connection failures qualify; timeouts and HTTP statuses
    /// never raise the network notice.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, HealthCheckError::ConnectionFailed(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HealthCheckError::Timeout(_))
    }
}

/// Reasons a sweep did not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    #[error("a sweep is already running")]
    AlreadyRunning,

    #[error("no models configured")]
    NoModels,
}

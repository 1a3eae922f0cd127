//! Relay error types

use thiserror::Error;

/// Internal relay failures. All of them answer 500 `{error, message}`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid relay request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

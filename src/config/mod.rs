//! Configuration module for llm-pulse
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PULSE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! The models catalog itself is not part of this file; it lives in a JSON
//! document resolved through [`StorageConfig`].
//!
//! # Example
//!
//! ```rust
//! use pulse::config::PulseConfig;
//!
//! let config = PulseConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! let toml = r#"
//! [health_check]
//! interval_seconds = 60
//! "#;
//! let config: PulseConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.health_check.interval_seconds, 60);
//! ```

pub mod error;
pub mod logging;
pub mod server;
pub mod storage;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use storage::StorageConfig;

// Re-export HealthCheckConfig from health module
pub use crate::health::HealthCheckConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unified configuration for the pulse server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PulseConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Probe timing and scheduling
    pub health_check: HealthCheckConfig,
    /// Models config sources
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl PulseConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the previous value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PULSE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("PULSE_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("PULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PULSE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(models) = std::env::var("PULSE_MODELS") {
            if !models.is_empty() {
                self.storage.models_file = Some(PathBuf::from(models));
            }
        }
        if let Ok(dir) = std::env::var("PULSE_DATA_DIR") {
            if !dir.is_empty() {
                self.storage.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(health) = std::env::var("PULSE_HEALTH_CHECK") {
            self.health_check.enabled = health.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if self.health_check.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "health_check.interval_seconds".to_string(),
                message: "interval must be at least one second".to_string(),
            });
        }
        if self.health_check.timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "health_check.timeout_ms".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

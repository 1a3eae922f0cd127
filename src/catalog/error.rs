//! Models config error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, parsing or persisting the models config.
#[derive(Error, Debug)]
pub enum ModelsConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Models config not found: {0}")]
    NotFound(PathBuf),

    #[error("Malformed models config: {0}")]
    Parse(String),

    #[error("Failed to persist models config: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for ModelsConfigError {
    fn from(e: serde_json::Error) -> Self {
        ModelsConfigError::Parse(e.to_string())
    }
}

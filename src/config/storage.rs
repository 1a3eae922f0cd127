//! Models config storage settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the models config is read from and saved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the persisted models config
    pub data_dir: PathBuf,
    /// Static models file used when nothing has been persisted
    pub models_file: Option<PathBuf>,
    /// Save configs replaced through the dashboard
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            models_file: Some(PathBuf::from("config.json")),
            persist: true,
        }
    }
}

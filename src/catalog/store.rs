//! Models config persistence and the startup load chain.
//!
//! Load precedence: persisted store, then the static `config.json`, then an
//! empty catalog (the dashboard asks the user to paste or upload JSON).

use super::{ModelsConfig, ModelsConfigError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Fixed key the user's catalog is persisted under.
pub const PERSISTED_CONFIG_KEY: &str = "llm-pulse.models";

/// Flat key-value persistence for the user's catalog.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<ModelsConfig>, ModelsConfigError>;

    async fn save(&self, config: &ModelsConfig) -> Result<(), ModelsConfigError>;
}

/// Stores the catalog as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    dir: PathBuf,
    key: String,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            key: PERSISTED_CONFIG_KEY.to_string(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> Result<Option<ModelsConfig>, ModelsConfigError> {
        match tokio::fs::read_to_string(self.path()).await {
            Ok(content) => ModelsConfig::from_json(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, config: &ModelsConfig) -> Result<(), ModelsConfigError> {
        let json = config.to_json_pretty()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a crash never leaves a half-written file.
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), "Persisted models config");
        Ok(())
    }
}

/// In-process store, used when persistence is disabled.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: RwLock<Option<ModelsConfig>>,
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<Option<ModelsConfig>, ModelsConfigError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, config: &ModelsConfig) -> Result<(), ModelsConfigError> {
        *self.inner.write().await = Some(config.clone());
        Ok(())
    }
}

/// Where the active catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Persisted,
    StaticFile(PathBuf),
    Uploaded,
    Empty,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Persisted => write!(f, "persisted"),
            ConfigSource::StaticFile(path) => write!(f, "file:{}", path.display()),
            ConfigSource::Uploaded => write!(f, "uploaded"),
            ConfigSource::Empty => write!(f, "empty"),
        }
    }
}

/// A catalog together with its source.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ModelsConfig,
    pub source: ConfigSource,
}

/// Read a static catalog file.
pub async fn load_static_file(path: &Path) -> Result<ModelsConfig, ModelsConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => ModelsConfig::from_json(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ModelsConfigError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve the startup catalog. Never fails: broken sources are logged and skipped.
pub async fn load_with_fallback(store: &dyn ConfigStore, static_path: Option<&Path>) -> LoadedConfig {
    match store.load().await {
        Ok(Some(config)) => {
            tracing::info!(models = config.model_count(), "Loaded persisted models config");
            return LoadedConfig {
                config,
                source: ConfigSource::Persisted,
            };
        }
        Ok(None) => tracing::debug!("No persisted models config"),
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable persisted models config"),
    }

    if let Some(path) = static_path {
        match load_static_file(path).await {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    models = config.model_count(),
                    "Loaded static models config"
                );
                return LoadedConfig {
                    config,
                    source: ConfigSource::StaticFile(path.to_path_buf()),
                };
            }
            Err(ModelsConfigError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "Static models config not found")
            }
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Ignoring malformed static models config"
            ),
        }
    }

    tracing::info!("No models configured; waiting for the dashboard to supply one");
    LoadedConfig {
        config: ModelsConfig::default(),
        source: ConfigSource::Empty,
    }
}

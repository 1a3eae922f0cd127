//! `pulse check`: one sweep over the configured models, printed and done.

use crate::catalog::{load_static_file, load_with_fallback, ConfigSource, FileConfigStore, LoadedConfig};
use crate::cli::output::{format_results_json, format_results_table, format_summary, result_views};
use crate::cli::serve::load_file_config;
use crate::cli::CheckArgs;
use crate::config::PulseConfig;
use crate::health::{HealthChecker, MonitorSession};
use std::path::Path;
use std::sync::Arc;

/// Run one sweep and render the results.
pub async fn handle_check(args: &CheckArgs) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = load_file_config(&args.config)?.with_env_overrides();
    if let Some(timeout_ms) = args.timeout_ms {
        config.health_check.timeout_ms = timeout_ms;
    }
    config.validate()?;

    let loaded = resolve_models(&config, args.models.as_deref()).await?;
    if loaded.config.is_empty() {
        return Err("No models configured. Pass --models <file> or set [storage].models_file.".into());
    }

    tracing::debug!(source = %loaded.source, models = loaded.config.model_count(), "Checking models");

    let session = Arc::new(MonitorSession::with_config(
        loaded.config.clone(),
        loaded.source,
    ));
    let checker = HealthChecker::new(session, config.health_check.clone());
    let entries = checker.check_all_models().await?;

    let views = result_views(&entries, &loaded.config);
    if args.json {
        Ok(format_results_json(&views)?)
    } else {
        Ok(format!(
            "{}\n{}",
            format_results_table(&views),
            format_summary(&views)
        ))
    }
}

/// An explicit models file must load; otherwise use the startup fallback chain.
async fn resolve_models(
    config: &PulseConfig,
    explicit: Option<&Path>,
) -> Result<LoadedConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => Ok(LoadedConfig {
            config: load_static_file(path).await?,
            source: ConfigSource::StaticFile(path.to_path_buf()),
        }),
        None => {
            let store = FileConfigStore::new(&config.storage.data_dir);
            Ok(load_with_fallback(&store, config.storage.models_file.as_deref()).await)
        }
    }
}

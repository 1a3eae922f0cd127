//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::catalog::{load_with_fallback, ConfigStore, FileConfigStore, MemoryConfigStore};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, LoggingConfig, PulseConfig};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Read the TOML file if present, defaults otherwise.
pub fn load_file_config(path: &Path) -> Result<PulseConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(PulseConfig::load(Some(path))?)
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        Ok(PulseConfig::default())
    }
}

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<PulseConfig, Box<dyn std::error::Error>> {
    let mut config = load_file_config(&args.config)?.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(ref models) = args.models {
        config.storage.models_file = Some(models.clone());
    }
    if args.no_health_check {
        config.health_check.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// File-backed store when persistence is on, in-memory otherwise.
pub fn build_store(config: &PulseConfig) -> Arc<dyn ConfigStore> {
    if config.storage.persist {
        Arc::new(FileConfigStore::new(&config.storage.data_dir))
    } else {
        Arc::new(MemoryConfigStore::default())
    }
}

/// Resolve the startup models config and install it in fresh app state.
///
/// The session is seeded directly rather than through a reload, so the
/// scheduler's own startup sweep is the only initial sweep.
pub async fn build_app_state(config: PulseConfig) -> Arc<AppState> {
    let store = build_store(&config);
    let loaded = load_with_fallback(store.as_ref(), config.storage.models_file.as_deref()).await;

    let state = Arc::new(AppState::new(Arc::new(config), store));
    state.session.replace_config(loaded.config, loaded.source);
    state
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    tracing::info!("Starting llm-pulse");
    tracing::debug!(?config, "Loaded configuration");

    let addr = config.server.bind_addr();
    let app_state = build_app_state(config).await;
    tracing::info!(
        source = %app_state.session.source(),
        generation = app_state.session.generation(),
        "Models config ready"
    );

    let app = create_router(Arc::clone(&app_state));

    let cancel_token = CancellationToken::new();
    let health_handle = Arc::clone(&app_state.checker).start(cancel_token.clone());

    tracing::info!(addr = %addr, "Dashboard listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    tracing::info!("Waiting for health checker to stop");
    health_handle.await?;

    tracing::info!("llm-pulse stopped");
    Ok(())
}

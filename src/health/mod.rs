//! Health checking module for model endpoint monitoring.
//!
//! The [`HealthChecker`] probes every configured model one at a time, with a
//! fixed pause between probes, and publishes each outcome to the session and
//! to dashboard subscribers. Only one sweep runs at a time: triggers that
//! arrive while a sweep is in flight are dropped.

mod config;
mod error;
mod request;
mod session;
mod state;


pub use config::*;
pub use error::*;
pub use request::*;
pub use session::*;
pub use state::*;

use crate::catalog::{ConfigSource, ConfiguredModel, ModelEndpoint, ModelsConfig};
use crate::dashboard::types::WebSocketUpdate;
use crate::dashboard::{view, websocket};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What started a sweep, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    Startup,
    Timer,
    Reload,
    Manual,
}

impl SweepTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepTrigger::Startup => "startup",
            SweepTrigger::Timer => "timer",
            SweepTrigger::Reload => "reload",
            SweepTrigger::Manual => "manual",
        }
    }
}

/// Background service that sweeps all configured models.
pub struct HealthChecker {
    /// Shared monitor state
    session: Arc<MonitorSession>,
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// Probe timing configuration
    config: HealthCheckConfig,
    /// Optional WebSocket broadcast sender for dashboard updates
    ws_broadcast: Option<broadcast::Sender<WebSocketUpdate>>,
    /// Wakes the scheduler after a config reload
    reload: Notify,
}

impl HealthChecker {
    /// Create a new health checker with a default HTTP client.
    pub fn new(session: Arc<MonitorSession>, config: HealthCheckConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self::with_client(session, config, client)
    }

    /// Create a health checker with a custom HTTP client (for testing).
    pub fn with_client(
        session: Arc<MonitorSession>,
        config: HealthCheckConfig,
        client: reqwest::Client,
    ) -> Self {
        Self {
            session,
            client,
            config,
            ws_broadcast: None,
            reload: Notify::new(),
        }
    }

    /// Set the WebSocket broadcast sender for dashboard updates.
    pub fn with_broadcast(mut self, sender: broadcast::Sender<WebSocketUpdate>) -> Self {
        self.ws_broadcast = Some(sender);
        self
    }

    pub fn session(&self) -> &Arc<MonitorSession> {
        &self.session
    }

    pub fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Probe a single endpoint once.
    ///
    /// Latency is measured from just before the request is sent to the
    /// arrival of the response head; it is only reported for ok statuses.
    pub async fn probe(&self, endpoint: &ModelEndpoint) -> ProbeResult {
        let body = ProbeRequest::for_model(&endpoint.model);
        let deadline = self.config.timeout();
        let start = Instant::now();

        let send = self
            .client
            .post(endpoint.completions_url())
            .bearer_auth(&endpoint.access_token)
            .json(&body)
            .timeout(deadline)
            .send();

        // Dropping the send future on expiry aborts the in-flight request.
        match tokio::time::timeout(deadline, send).await {
            Ok(Ok(response)) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    ProbeResult::available(latency_ms)
                } else {
                    ProbeResult::failed(HealthCheckError::HttpError(status.as_u16()))
                }
            }
            Ok(Err(e)) => ProbeResult::failed(Self::classify_error(e, self.config.timeout_ms)),
            Err(_) => ProbeResult::failed(HealthCheckError::Timeout(self.config.timeout_ms)),
        }
    }

    /// Classify reqwest error into HealthCheckError.
    fn classify_error(e: reqwest::Error, timeout_ms: u64) -> HealthCheckError {
        if e.is_timeout() {
            HealthCheckError::Timeout(timeout_ms)
        } else if e.is_connect() || e.is_request() {
            HealthCheckError::ConnectionFailed(error_chain(&e))
        } else {
            HealthCheckError::RequestFailed(error_chain(&e))
        }
    }

    /// Probe one model and publish the outcome.
    async fn check_model(
        &self,
        generation: u64,
        provider: &str,
        model: &ConfiguredModel,
    ) -> ProbeResult {
        if self.session.mark_checking(generation, provider, &model.name) {
            let card = view::render_card(
                provider,
                &model.name,
                &model.endpoint,
                &SlotState::Checking,
            );
            self.broadcast(websocket::create_probe_started_update(generation, card));
        }

        let result = self.probe(&model.endpoint).await;
        let checked_at = chrono::Utc::now();

        if let Some(error) = &result.error {
            if error.is_network_failure() && self.session.raise_network_notice() {
                tracing::warn!(
                    provider = provider,
                    model = %model.name,
                    error = %error,
                    "Endpoint unreachable; the network path may be blocked"
                );
                self.broadcast(websocket::create_network_notice_update(error.to_string()));
            }
        }

        metrics::counter!("pulse_probes_total",
            "provider" => provider.to_string(),
            "model" => model.name.clone(),
            "status" => result.status.to_string()
        )
        .increment(1);
        if let Some(latency_ms) = result.latency_ms {
            metrics::histogram!("pulse_probe_latency_seconds",
                "provider" => provider.to_string(),
                "model" => model.name.clone()
            )
            .record(latency_ms as f64 / 1000.0);
        }

        tracing::debug!(
            provider = provider,
            model = %model.name,
            status = %result.status,
            latency_ms = ?result.latency_ms,
            error = ?result.error_message(),
            "Probe finished"
        );

        if self
            .session
            .record(generation, provider, &model.name, result.clone(), checked_at)
        {
            let slot = SlotState::Checked {
                result: result.clone(),
                checked_at,
            };
            let card = view::render_card(provider, &model.name, &model.endpoint, &slot);
            self.broadcast(websocket::create_probe_result_update(
                generation, &result, card,
            ));
        }

        result
    }

    /// Probe every model of `config` in order, pausing after each probe.
    ///
    /// Stops early if the session moves past `generation` mid-sweep; the
    /// completion stamp is only set for a sweep that finished on a current
    /// generation.
    pub async fn run_sweep(&self, config: &ModelsConfig, generation: u64) -> Vec<SweepEntry> {
        let mut results = Vec::with_capacity(config.model_count());

        for (provider, model) in config.entries() {
            if self.session.generation() != generation {
                tracing::debug!(generation, "Config replaced mid-sweep, abandoning");
                return results;
            }

            let result = self.check_model(generation, provider, model).await;
            results.push(SweepEntry {
                provider: provider.to_string(),
                model: model.name.clone(),
                result,
            });

            tokio::time::sleep(self.config.pause()).await;
        }

        if let Some(completed_at) = self.session.finish_sweep(generation) {
            metrics::counter!("pulse_sweeps_total").increment(1);
            self.broadcast(websocket::create_sweep_complete_update(
                generation,
                completed_at,
                results.len(),
            ));
        }

        results
    }

    /// Claim the single-sweep guard.
    pub fn try_begin_sweep(&self) -> Result<SweepGuard, SweepError> {
        self.session
            .try_begin_sweep()
            .ok_or(SweepError::AlreadyRunning)
    }

    /// Sweep the session's current catalog while holding `guard`.
    ///
    /// If the catalog is replaced during the sweep, the sweep restarts on the
    /// new one, so a reload is never lost to the overlap guard.
    pub async fn run_guarded(&self, guard: SweepGuard) -> Vec<SweepEntry> {
        self.sweep_to_completion(guard).await.1
    }

    /// Like [`run_guarded`](Self::run_guarded), also returning the generation
    /// the finished sweep covered.
    async fn sweep_to_completion(&self, guard: SweepGuard) -> (u64, Vec<SweepEntry>) {
        let _guard = guard;
        loop {
            let (config, generation) = self.session.current();
            let results = self.run_sweep(&config, generation).await;
            if self.session.generation() == generation {
                return (generation, results);
            }
            tracing::info!("Models config reloaded during sweep, restarting");
        }
    }

    /// Run one guarded sweep to completion.
    pub async fn check_all_models(&self) -> Result<Vec<SweepEntry>, SweepError> {
        let guard = self.try_begin_sweep()?;
        Ok(self.run_guarded(guard).await)
    }

    /// Start a sweep in the background (manual trigger).
    pub fn trigger(self: &Arc<Self>) -> Result<(), SweepError> {
        if self.session.is_empty() {
            return Err(SweepError::NoModels);
        }
        let guard = self.try_begin_sweep()?;
        let checker = Arc::clone(self);

        tokio::spawn(async move {
            let results = checker.run_guarded(guard).await;
            tracing::debug!(
                trigger = SweepTrigger::Manual.as_str(),
                models_checked = results.len(),
                "Health check sweep completed"
            );
        });
        Ok(())
    }

    /// Replace the catalog and wake the scheduler for an immediate sweep.
    pub fn reload(&self, config: ModelsConfig, source: ConfigSource) -> u64 {
        let providers = config.provider_count();
        let models = config.model_count();
        let generation = self.session.replace_config(config, source);

        tracing::info!(generation, providers, models, "Models config reloaded");
        self.broadcast(websocket::create_config_reloaded_update(
            generation, providers, models,
        ));
        self.reload.notify_one();
        generation
    }

    /// Run a scheduler-owned sweep. Returns the generation it completed, or
    /// `None` when it was skipped or cancelled.
    async fn scheduled_sweep(
        &self,
        trigger: SweepTrigger,
        cancel_token: &CancellationToken,
    ) -> Option<u64> {
        if self.session.is_empty() {
            tracing::debug!(trigger = trigger.as_str(), "No models configured, skipping sweep");
            return None;
        }

        let guard = match self.try_begin_sweep() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!(trigger = trigger.as_str(), "Sweep already running, skipping");
                return None;
            }
        };

        tokio::select! {
            _ = cancel_token.cancelled() => None,
            (generation, results) = self.sweep_to_completion(guard) => {
                tracing::debug!(
                    trigger = trigger.as_str(),
                    generation,
                    models_checked = results.len(),
                    "Health check sweep completed"
                );
                Some(generation)
            }
        }
    }

    /// Start the scheduler task: one sweep right away, then on every timer
    /// tick and every reload until cancelled.
    ///
    /// Ticks that fall inside a running sweep are dropped, and a reload whose
    /// generation was already covered by the sweep in flight (which restarts
    /// itself on reload) does not trigger a second pass.
    pub fn start(self: Arc<Self>, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.config.interval();

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                timer_enabled = self.config.enabled,
                "Health checker started"
            );

            let mut last_swept = self
                .scheduled_sweep(SweepTrigger::Startup, &cancel_token)
                .await;

            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Health checker shutting down");
                        break;
                    }
                    _ = self.reload.notified() => {
                        if last_swept == Some(self.session.generation()) {
                            tracing::debug!("Reload already covered by the last sweep");
                            continue;
                        }
                        if let Some(generation) =
                            self.scheduled_sweep(SweepTrigger::Reload, &cancel_token).await
                        {
                            last_swept = Some(generation);
                        }
                        interval.reset();
                    }
                    _ = interval.tick(), if self.config.enabled => {
                        let started = tokio::time::Instant::now();
                        if let Some(generation) =
                            self.scheduled_sweep(SweepTrigger::Timer, &cancel_token).await
                        {
                            last_swept = Some(generation);
                        }
                        if started.elapsed() >= period {
                            interval.reset();
                        }
                    }
                }
            }
        })
    }

    fn broadcast(&self, update: WebSocketUpdate) {
        if let Some(sender) = &self.ws_broadcast {
            // Ignore error if no receivers are listening
            let _ = sender.send(update);
        }
    }
}

/// Render an error with its sources, e.g. "error sending request: connection refused".
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

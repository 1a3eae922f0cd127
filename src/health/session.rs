//! Monitor session: the shared state the runner writes and the dashboard reads.
//!
//! Each config reload starts a new *generation*. Slots are re-seeded, the
//! network notice is re-armed and results tagged with an older generation
//! are rejected, so a sweep that outlives its config cannot overwrite newer
//! state.

use super::state::{ProbeResult, SlotState};
use crate::catalog::{ConfigSource, ModelsConfig};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type SlotKey = (String, String);

#[derive(Debug, Clone)]
struct Slot {
    generation: u64,
    state: SlotState,
}

#[derive(Debug)]
struct Active {
    config: Arc<ModelsConfig>,
    source: ConfigSource,
    generation: u64,
}

/// Shared monitor state with explicit reset semantics.
#[derive(Debug)]
pub struct MonitorSession {
    active: RwLock<Active>,
    /// Mirror of the active generation for lock-free staleness checks
    generation: AtomicU64,
    network_notice: AtomicBool,
    sweep_running: Arc<AtomicBool>,
    slots: DashMap<SlotKey, Slot>,
    last_updated: RwLock<Option<DateTime<Utc>>>,
}

/// Held for the duration of a sweep; releases the single-sweep flag on drop.
#[derive(Debug)]
pub struct SweepGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl MonitorSession {
    /// Create a session with an empty catalog (generation 0).
    pub fn new() -> Self {
        Self {
            active: RwLock::new(Active {
                config: Arc::new(ModelsConfig::default()),
                source: ConfigSource::Empty,
                generation: 0,
            }),
            generation: AtomicU64::new(0),
            network_notice: AtomicBool::new(false),
            sweep_running: Arc::new(AtomicBool::new(false)),
            slots: DashMap::new(),
            last_updated: RwLock::new(None),
        }
    }

    /// Create a session already holding `config`.
    pub fn with_config(config: ModelsConfig, source: ConfigSource) -> Self {
        let session = Self::new();
        session.replace_config(config, source);
        session
    }

    /// Swap in a new catalog and start a new generation.
    ///
    /// Clears every slot, re-arms the network notice and forgets the last
    /// sweep time. Returns the new generation.
    pub fn replace_config(&self, config: ModelsConfig, source: ConfigSource) -> u64 {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let generation = active.generation + 1;

        // Publish the generation first so in-flight records are rejected.
        self.generation.store(generation, Ordering::Release);
        self.slots.clear();
        for (provider, model) in config.entries() {
            self.slots.insert(
                (provider.to_string(), model.name.clone()),
                Slot {
                    generation,
                    state: SlotState::Pending,
                },
            );
        }
        self.network_notice.store(false, Ordering::Release);
        *self
            .last_updated
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        *active = Active {
            config: Arc::new(config),
            source,
            generation,
        };
        generation
    }

    /// Current catalog and its generation.
    pub fn current(&self) -> (Arc<ModelsConfig>, u64) {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&active.config), active.generation)
    }

    pub fn source(&self) -> ConfigSource {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .source
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// True when the current catalog has no models.
    pub fn is_empty(&self) -> bool {
        self.current().0.is_empty()
    }

    /// Claim the single-sweep flag. `None` if a sweep is already running.
    pub fn try_begin_sweep(&self) -> Option<SweepGuard> {
        self.sweep_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SweepGuard {
                flag: Arc::clone(&self.sweep_running),
            })
    }

    pub fn is_sweep_running(&self) -> bool {
        self.sweep_running.load(Ordering::Acquire)
    }

    /// Raise the sticky network notice. Returns true only for the call that set it.
    pub fn raise_network_notice(&self) -> bool {
        self.network_notice
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn network_notice(&self) -> bool {
        self.network_notice.load(Ordering::Acquire)
    }

    /// Mark a model as being probed. Returns false for a stale generation.
    pub fn mark_checking(&self, generation: u64, provider: &str, model: &str) -> bool {
        self.update_slot(generation, provider, model, SlotState::Checking)
    }

    /// Store a probe result. Returns false for a stale generation.
    pub fn record(
        &self,
        generation: u64,
        provider: &str,
        model: &str,
        result: ProbeResult,
        checked_at: DateTime<Utc>,
    ) -> bool {
        self.update_slot(
            generation,
            provider,
            model,
            SlotState::Checked { result, checked_at },
        )
    }

    fn update_slot(&self, generation: u64, provider: &str, model: &str, state: SlotState) -> bool {
        match self
            .slots
            .get_mut(&(provider.to_string(), model.to_string()))
        {
            Some(mut slot) if slot.generation == generation => {
                slot.state = state;
                true
            }
            _ => false,
        }
    }

    /// Slot state for a model; `Pending` when unknown.
    pub fn slot(&self, provider: &str, model: &str) -> SlotState {
        self.slots
            .get(&(provider.to_string(), model.to_string()))
            .map(|slot| slot.state.clone())
            .unwrap_or_default()
    }

    /// Stamp the end of a sweep. Returns the stamp if the generation is current.
    pub fn finish_sweep(&self, generation: u64) -> Option<DateTime<Utc>> {
        if generation != self.generation() {
            return None;
        }
        let now = Utc::now();
        *self
            .last_updated
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(now);
        Some(now)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MonitorSession {
    fn default() -> Self {
        Self::new()
    }
}

//! Config bootstrap sequencer: obtains the configuration snapshot and provider catalog,
//! retries the status call once, and publishes whole-value state updates.
//!
//! Status and catalog are independent resources. Only the status call is retried; a
//! failed catalog fetch leaves the previous catalog in place.

mod state;

pub use state::{BootstrapState, Degraded};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::core::bus::{ConfigBus, Subscription};
use crate::core::catalog::{ProviderCatalog, ProvidersPayload};
use crate::core::config::{CONFIG_UPDATE_PATH, PROVIDERS_PATH, STATUS_PATH, Timeouts};
use crate::core::error::{SyncError, compact_error};
use crate::core::fetch::{FetchRequest, Transport, bounded_fetch};
use crate::core::hints::EnvironmentHints;
use crate::core::retry::RetryTimer;
use crate::core::snapshot::{ConfigSnapshot, StatusPayload};

/// A failed status attempt, with hints when the gateway supplied them.
struct StatusFailure {
    error: SyncError,
    env_hints: Option<EnvironmentHints>,
}

impl From<SyncError> for StatusFailure {
    fn from(error: SyncError) -> Self {
        Self {
            error,
            env_hints: None,
        }
    }
}

/// The active status cycle; superseded by the next `begin_status_cycle`.
struct StatusCycle {
    id: u64,
    token: CancellationToken,
}

pub struct ConfigSequencer {
    transport: Arc<dyn Transport>,
    timeouts: Timeouts,
    state: watch::Sender<BootstrapState>,
    catalog: watch::Sender<ProviderCatalog>,
    status_cycle: Mutex<Option<StatusCycle>>,
    next_cycle_id: AtomicU64,
    catalog_generation: AtomicU64,
    /// Generation of the fetch whose result is currently published.
    catalog_applied: AtomicU64,
}

impl ConfigSequencer {
    pub fn new(transport: Arc<dyn Transport>, timeouts: Timeouts) -> Self {
        let (state, _) = watch::channel(BootstrapState::Loading);
        let (catalog, _) = watch::channel(ProviderCatalog::default());
        Self {
            transport,
            timeouts,
            state,
            catalog,
            status_cycle: Mutex::new(None),
            next_cycle_id: AtomicU64::new(0),
            catalog_generation: AtomicU64::new(0),
            catalog_applied: AtomicU64::new(0),
        }
    }

    /// Install a previously known catalog (e.g. from disk) before the first fetch.
    pub fn seed_catalog(&self, catalog: ProviderCatalog) {
        if !catalog.is_empty() {
            self.catalog.send_replace(catalog);
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state.borrow().clone()
    }

    pub fn catalog(&self) -> ProviderCatalog {
        self.catalog.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<BootstrapState> {
        self.state.subscribe()
    }

    pub fn watch_catalog(&self) -> watch::Receiver<ProviderCatalog> {
        self.catalog.subscribe()
    }

    /// Run one bootstrap cycle to completion and return the resulting state.
    ///
    /// Starting a cycle cancels any pending retry of the previous one. If this cycle is
    /// itself superseded, it publishes nothing and returns whatever is current.
    pub async fn bootstrap(&self) -> BootstrapState {
        let cycle = self.begin_status_cycle();
        self.run_status_cycle(cycle).await
    }

    fn begin_status_cycle(&self) -> StatusCycle {
        let id = self.next_cycle_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let mut slot = self.status_cycle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(StatusCycle {
            id,
            token: token.clone(),
        }) {
            log::debug!("status cycle {} superseded by {}", previous.id, id);
            previous.token.cancel();
        }
        // A ready snapshot stays visible while it is being refreshed.
        if !self.state.borrow().is_ready() {
            self.state.send_replace(BootstrapState::Loading);
        }
        StatusCycle { id, token }
    }

    async fn run_status_cycle(&self, cycle: StatusCycle) -> BootstrapState {
        let failure = match self.attempt_status().await {
            Ok((snapshot, onboarded)) => {
                return self.finish_status_cycle(&cycle, BootstrapState::Ready { snapshot, onboarded });
            }
            Err(failure) => failure,
        };

        if cycle.token.is_cancelled() {
            return self.state();
        }
        log::info!(
            "status fetch failed ({}); retrying once in {} ms",
            failure.error,
            self.timeouts.retry_delay.as_millis()
        );

        let timer = RetryTimer::schedule(self.timeouts.retry_delay, cycle.token.clone());
        if !timer.elapsed().await {
            log::debug!("status retry of cycle {} cancelled", cycle.id);
            return self.state();
        }

        match self.attempt_status().await {
            Ok((snapshot, onboarded)) => {
                self.finish_status_cycle(&cycle, BootstrapState::Ready { snapshot, onboarded })
            }
            Err(failure) => {
                log::warn!("backend unavailable after retry: {}", failure.error);
                self.finish_status_cycle(
                    &cycle,
                    BootstrapState::Degraded(Degraded {
                        reason: failure.error,
                        env_hints: failure.env_hints,
                    }),
                )
            }
        }
    }

    /// Publish `next` only if `cycle` is still the active one.
    fn finish_status_cycle(&self, cycle: &StatusCycle, next: BootstrapState) -> BootstrapState {
        let mut slot = self.status_cycle.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(active) if active.id == cycle.id => {
                *slot = None;
                log::info!("bootstrap {}", next.label());
                self.state.send_replace(next.clone());
                next
            }
            _ => self.state.borrow().clone(),
        }
    }

    async fn attempt_status(&self) -> Result<(ConfigSnapshot, bool), StatusFailure> {
        let response = bounded_fetch(
            self.transport.as_ref(),
            &FetchRequest::get(STATUS_PATH),
            self.timeouts.status,
        )
        .await?;

        if !response.is_success() {
            let payload = serde_json::from_str::<StatusPayload>(&response.body).ok();
            let reason = payload
                .as_ref()
                .and_then(|p| p.error.clone())
                .unwrap_or_else(|| compact_error(&response.body));
            return Err(StatusFailure {
                error: SyncError::Backend {
                    status: response.status,
                    reason,
                },
                env_hints: payload.and_then(|p| p.env_hints),
            });
        }

        let payload: StatusPayload = response.json()?;
        match payload.config {
            Some(snapshot) => Ok((snapshot, payload.onboarded)),
            None => Err(StatusFailure {
                error: SyncError::Validation("status response carried no config".to_string()),
                env_hints: payload.env_hints,
            }),
        }
    }

    /// Fetch the provider catalog once. On success with a non-empty list the published
    /// catalog is replaced; otherwise it is left untouched and the error returned.
    pub async fn fetch_catalog(&self) -> Result<ProviderCatalog, SyncError> {
        let generation = self.catalog_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let response = bounded_fetch(
            self.transport.as_ref(),
            &FetchRequest::get(PROVIDERS_PATH),
            self.timeouts.catalog,
        )
        .await?;
        if !response.is_success() {
            return Err(SyncError::backend(response.status, &response.body));
        }

        let payload: ProvidersPayload = response.json()?;
        let fetched = ProviderCatalog::new(payload.providers);
        if fetched.is_empty() {
            return Err(SyncError::Validation("provider list is empty".to_string()));
        }

        // Dropped only if a newer result has already been published.
        let applied = self.catalog.send_if_modified(|current| {
            if self.catalog_applied.load(Ordering::SeqCst) > generation {
                return false;
            }
            self.catalog_applied.store(generation, Ordering::SeqCst);
            *current = fetched.clone();
            true
        });
        if applied {
            log::debug!("catalog replaced ({} providers)", fetched.len());
            Ok(fetched)
        } else {
            log::debug!("catalog fetch {} superseded; result dropped", generation);
            Ok(self.catalog())
        }
    }

    /// Re-run bootstrap and the catalog fetch in the background.
    pub fn refresh(self: &Arc<Self>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("config refresh requested outside the async runtime; ignored");
            return;
        };
        log::info!("configuration changed; refreshing status and catalog");

        let cycle = self.begin_status_cycle();
        let status = Arc::clone(self);
        runtime.spawn(async move {
            status.run_status_cycle(cycle).await;
        });

        let catalog = Arc::clone(self);
        runtime.spawn(async move {
            if let Err(e) = catalog.fetch_catalog().await {
                log::warn!("catalog refresh failed, keeping previous catalog: {}", e);
            }
        });
    }

    /// Refresh whenever `bus` publishes. The listener holds only a weak reference.
    pub fn attach(self: &Arc<Self>, bus: &ConfigBus) -> Subscription {
        let weak = Arc::downgrade(self);
        bus.subscribe(move || {
            if let Some(sequencer) = weak.upgrade() {
                sequencer.refresh();
            }
        })
    }

    /// Ask the backend to switch the active provider/model.
    pub async fn update_provider(&self, provider: &str, model: &str) -> Result<(), SyncError> {
        let request = FetchRequest::post(
            CONFIG_UPDATE_PATH,
            json!({ "provider": provider, "model": model }),
        );
        let response = bounded_fetch(self.transport.as_ref(), &request, self.timeouts.update).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(SyncError::backend(response.status, &response.body))
        }
    }

    /// Replace the snapshot with one pointing at the acknowledged provider/model.
    pub fn commit_selection(&self, provider: &str, model: &str) {
        self.state.send_modify(|state| {
            let next = match state {
                BootstrapState::Ready {
                    snapshot,
                    onboarded,
                } => BootstrapState::Ready {
                    snapshot: snapshot.with_selection(provider, model),
                    onboarded: *onboarded,
                },
                _ => BootstrapState::Ready {
                    snapshot: ConfigSnapshot {
                        llm_provider: provider.to_string(),
                        llm_model: model.to_string(),
                        llm_configs: Default::default(),
                    },
                    onboarded: true,
                },
            };
            *state = next;
        });
    }
}

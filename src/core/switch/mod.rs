//! Two-step provider -> model switch.
//!
//! `Closed -> ProviderStep -> ModelStep -> Closed`. The model step carries the selected
//! provider, so committing without a provider cannot be expressed. A commit blocks further
//! commits until the backend answers; there is no automatic retry.


use crate::core::catalog::ProviderCatalog;
use crate::core::error::SyncError;
use crate::core::sequencer::ConfigSequencer;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SwitchState {
    #[default]
    Closed,
    ProviderStep,
    ModelStep { provider_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwitchError {
    #[error("no provider selected")]
    NotInModelStep,
    #[error("a provider update is already in flight")]
    UpdateInFlight,
    #[error("model '{model}' is not offered by provider '{provider}'")]
    UnknownModel { provider: String, model: String },
    #[error("provider update failed: {0}")]
    Update(#[from] SyncError),
}

/// An update that has been sent (or is about to be) and must be finished exactly once.
#[derive(Debug)]
#[must_use = "a started commit must be passed to finish_commit"]
pub struct PendingCommit {
    pub provider_id: String,
    pub model: String,
}

/// The in-flight commit survives `cancel`, so closing and reopening the panel cannot
/// start a second update before the first one is answered.
#[derive(Debug, Default)]
pub struct ProviderSwitch {
    state: SwitchState,
    in_flight: bool,
}

impl ProviderSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SwitchState {
        &self.state
    }

    /// True from `begin_commit` until `finish_commit`, whether or not the panel is open.
    pub fn is_updating(&self) -> bool {
        self.in_flight
    }

    pub fn open(&mut self) {
        if self.state == SwitchState::Closed {
            self.state = SwitchState::ProviderStep;
        }
    }

    /// Move to the model step. No-op (returns false) unless the provider is listed, has a
    /// key, and offers at least one model.
    pub fn select_provider(&mut self, catalog: &ProviderCatalog, provider_id: &str) -> bool {
        if self.state != SwitchState::ProviderStep {
            return false;
        }
        match catalog.get(provider_id) {
            Some(provider) if provider.is_selectable() => {
                self.state = SwitchState::ModelStep {
                    provider_id: provider.id.clone(),
                };
                true
            }
            _ => {
                log::debug!("provider '{}' is not selectable", provider_id);
                false
            }
        }
    }

    /// Return to the provider step. Not allowed while an update is in flight.
    pub fn back(&mut self) -> bool {
        if self.is_updating() {
            return false;
        }
        match self.state {
            SwitchState::ModelStep { .. } => {
                self.state = SwitchState::ProviderStep;
                true
            }
            _ => false,
        }
    }

    /// Close without side effects. An in-flight update still reconciles when it finishes.
    pub fn cancel(&mut self) {
        self.state = SwitchState::Closed;
    }

    /// Start committing `model` for the selected provider.
    pub fn begin_commit(
        &mut self,
        catalog: &ProviderCatalog,
        model: &str,
    ) -> Result<PendingCommit, SwitchError> {
        if self.is_updating() {
            return Err(SwitchError::UpdateInFlight);
        }
        let SwitchState::ModelStep { provider_id } = &self.state else {
            return Err(SwitchError::NotInModelStep);
        };
        let offered = catalog
            .get(provider_id.as_str())
            .is_some_and(|p| p.offers_model(model));
        if !offered {
            return Err(SwitchError::UnknownModel {
                provider: provider_id.clone(),
                model: model.to_string(),
            });
        }
        let pending = PendingCommit {
            provider_id: provider_id.clone(),
            model: model.to_string(),
        };
        self.in_flight = true;
        Ok(pending)
    }

    /// Apply the backend's answer. Success replaces the snapshot and closes; failure leaves
    /// the snapshot alone and re-enables the model step.
    pub fn finish_commit(
        &mut self,
        pending: PendingCommit,
        result: Result<(), SyncError>,
        sequencer: &ConfigSequencer,
    ) -> Result<(), SwitchError> {
        self.in_flight = false;
        match result {
            Ok(()) => {
                log::info!("switched to {} / {}", pending.provider_id, pending.model);
                sequencer.commit_selection(&pending.provider_id, &pending.model);
                self.state = SwitchState::Closed;
                Ok(())
            }
            Err(e) => {
                log::warn!(
                    "switch to {} / {} failed: {}",
                    pending.provider_id,
                    pending.model,
                    e
                );
                Err(SwitchError::Update(e))
            }
        }
    }

    /// Commit `model`: send the update and reconcile with the answer.
    pub async fn select_model(
        &mut self,
        model: &str,
        catalog: &ProviderCatalog,
        sequencer: &ConfigSequencer,
    ) -> Result<(), SwitchError> {
        let pending = self.begin_commit(catalog, model)?;
        let result = sequencer
            .update_provider(&pending.provider_id, &pending.model)
            .await;
        self.finish_commit(pending, result, sequencer)
    }
}

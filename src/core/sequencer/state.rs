//! Bootstrap state published by the sequencer.

use crate::core::error::SyncError;
use crate::core::hints::EnvironmentHints;
use crate::core::snapshot::ConfigSnapshot;

/// Why bootstrap gave up, plus any advisory defaults the gateway attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Degraded {
    pub reason: SyncError,
    pub env_hints: Option<EnvironmentHints>,
}

/// `Degraded` is only reached after the retry budget is spent; `Ready` always has a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum BootstrapState {
    Loading,
    Ready {
        snapshot: ConfigSnapshot,
        onboarded: bool,
    },
    Degraded(Degraded),
}

impl BootstrapState {
    pub fn snapshot(&self) -> Option<&ConfigSnapshot> {
        match self {
            BootstrapState::Ready { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, BootstrapState::Ready { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, BootstrapState::Degraded(_))
    }

    /// Short lowercase name for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            BootstrapState::Loading => "loading",
            BootstrapState::Ready { .. } => "ready",
            BootstrapState::Degraded(_) => "degraded",
        }
    }
}

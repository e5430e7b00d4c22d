//! What a settings surface should show, derived from published state.

use crate::core::catalog::ProviderCatalog;
use crate::core::sequencer::{BootstrapState, Degraded};
use crate::core::snapshot::ConfigSnapshot;

/// Where displayed values came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewSource {
    /// Confirmed backend state.
    Confirmed,
    /// Environment defaults; not backend state.
    Advisory,
    /// Nothing known yet.
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsView {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub source: ViewSource,
}

pub fn settings_view(state: &BootstrapState) -> SettingsView {
    if let Some(snapshot) = state.snapshot() {
        return SettingsView {
            provider: Some(snapshot.llm_provider.clone()),
            model: Some(snapshot.llm_model.clone()),
            source: ViewSource::Confirmed,
        };
    }
    match state {
        BootstrapState::Degraded(Degraded {
            env_hints: Some(hints),
            ..
        }) => SettingsView {
            provider: Some(hints.llm_provider.clone()),
            model: hints.hinted_model().map(str::to_string),
            source: ViewSource::Advisory,
        },
        _ => SettingsView {
            provider: None,
            model: None,
            source: ViewSource::Pending,
        },
    }
}

/// One row of the provider list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderOption {
    pub id: String,
    pub name: String,
    pub models: Vec<String>,
    /// Disabled rows are rendered but cannot be picked.
    pub enabled: bool,
}

pub fn provider_options(catalog: &ProviderCatalog) -> Vec<ProviderOption> {
    catalog
        .providers()
        .iter()
        .map(|p| ProviderOption {
            id: p.id.clone(),
            name: p.name.clone(),
            models: p.models.clone(),
            enabled: p.is_selectable(),
        })
        .collect()
}

/// The active provider/model as displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveDisplay {
    pub provider_label: String,
    pub model: String,
    /// False when the configured provider/model is missing from the current catalog.
    pub listed: bool,
}

/// Label the active selection. Values missing from a refreshed catalog are shown as-is.
pub fn active_display(snapshot: &ConfigSnapshot, catalog: &ProviderCatalog) -> ActiveDisplay {
    let provider = catalog.get(&snapshot.llm_provider);
    ActiveDisplay {
        provider_label: provider
            .map(|p| p.name.clone())
            .unwrap_or_else(|| snapshot.llm_provider.clone()),
        model: snapshot.llm_model.clone(),
        listed: provider.is_some_and(|p| p.offers_model(&snapshot.llm_model)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{ProviderDescriptor, fallback_catalog};
    use crate::core::error::SyncError;
    use crate::core::hints::EnvironmentHints;

    fn snapshot(provider: &str, model: &str) -> ConfigSnapshot {
        ConfigSnapshot {
            llm_provider: provider.into(),
            llm_model: model.into(),
            llm_configs: Default::default(),
        }
    }

    #[test]
    fn ready_state_shows_confirmed_values() {
        let view = settings_view(&BootstrapState::Ready {
            snapshot: snapshot("openai", "gpt-4o"),
            onboarded: true,
        });
        assert_eq!(view.provider.as_deref(), Some("openai"));
        assert_eq!(view.model.as_deref(), Some("gpt-4o"));
        assert_eq!(view.source, ViewSource::Confirmed);
    }

    #[test]
    fn degraded_state_shows_hinted_provider_as_advisory() {
        let hints = EnvironmentHints::from_lookup(|k| (k == "LLM_PROVIDER").then(|| "ollama".to_string()));
        let view = settings_view(&BootstrapState::Degraded(Degraded {
            reason: SyncError::backend(503, ""),
            env_hints: Some(hints),
        }));
        assert_eq!(view.provider.as_deref(), Some("ollama"));
        assert_eq!(view.model.as_deref(), Some("llama3.1"));
        assert_eq!(view.source, ViewSource::Advisory);
    }

    #[test]
    fn degraded_without_hints_and_loading_are_pending() {
        let degraded = BootstrapState::Degraded(Degraded {
            reason: SyncError::Network("refused".into()),
            env_hints: None,
        });
        assert_eq!(settings_view(&degraded).source, ViewSource::Pending);
        assert_eq!(settings_view(&BootstrapState::Loading).provider, None);
    }

    #[test]
    fn fallback_options_are_present_but_disabled() {
        let options = provider_options(fallback_catalog());
        assert_eq!(options.len(), 4);
        assert!(options.iter().all(|o| !o.enabled));
    }

    #[test]
    fn active_display_uses_catalog_name_when_listed() {
        let catalog = ProviderCatalog::new(vec![ProviderDescriptor {
            id: "openai".into(),
            name: "OpenAI".into(),
            models: vec!["gpt-4o".into()],
            has_api_key: true,
        }]);
        let display = active_display(&snapshot("openai", "gpt-4o"), &catalog);
        assert_eq!(display.provider_label, "OpenAI");
        assert!(display.listed);
    }

    #[test]
    fn active_display_keeps_last_known_values_when_unlisted() {
        let display = active_display(&snapshot("mistral", "mistral-large"), fallback_catalog());
        assert_eq!(display.provider_label, "mistral");
        assert_eq!(display.model, "mistral-large");
        assert!(!display.listed);
    }
}

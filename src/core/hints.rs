//! Environment-derived configuration hints for when the backend never answers.
//!
//! Hints are advisory: they pre-populate a settings surface but are never treated as
//! confirmed backend state. Built only from local defaults and environment variables.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::core::catalog::fallback_catalog;

const DEFAULT_PROVIDER: &str = "anthropic";
const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Per-provider defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHint {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Default location of an auxiliary service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationHint {
    pub host: String,
    pub port: u16,
}

/// Best-effort configuration synthesized without the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentHints {
    pub llm_provider: String,
    #[serde(default)]
    pub llm_configs: BTreeMap<String, ProviderHint>,
    #[serde(default)]
    pub integrations: BTreeMap<String, IntegrationHint>,
}

impl EnvironmentHints {
    /// Synthesize hints from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Synthesize hints from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut llm_configs = BTreeMap::new();
        for provider in fallback_catalog().providers() {
            let prefix = env_prefix(&provider.id);
            let model = var(&format!("{}_MODEL", prefix))
                .or_else(|| provider.models.first().cloned())
                .unwrap_or_default();
            let base_url = match provider.id.as_str() {
                "ollama" => Some(var("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string())),
                _ => var(&format!("{}_BASE_URL", prefix)),
            };
            llm_configs.insert(provider.id.clone(), ProviderHint { model, base_url });
        }

        let llm_provider = var("LLM_PROVIDER")
            .map(|p| p.to_lowercase())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        let mut integrations = BTreeMap::new();
        integrations.insert(
            "searxng".to_string(),
            integration(&var, "SEARXNG", "localhost", 8080),
        );
        integrations.insert(
            "qdrant".to_string(),
            integration(&var, "QDRANT", "localhost", 6333),
        );

        Self {
            llm_provider,
            llm_configs,
            integrations,
        }
    }

    /// Model hinted for the hinted provider, if that provider is known.
    pub fn hinted_model(&self) -> Option<&str> {
        self.llm_configs
            .get(&self.llm_provider)
            .map(|c| c.model.as_str())
            .filter(|m| !m.is_empty())
    }
}

/// `google` reads `GEMINI_*`; everything else reads `<ID>_*`.
fn env_prefix(provider_id: &str) -> String {
    match provider_id {
        "google" => "GEMINI".to_string(),
        other => other.to_uppercase().replace('-', "_"),
    }
}

fn integration<F>(var: &F, prefix: &str, default_host: &str, default_port: u16) -> IntegrationHint
where
    F: Fn(&str) -> Option<String>,
{
    let host = var(&format!("{}_HOST", prefix)).unwrap_or_else(|| default_host.to_string());
    let port = match var(&format!("{}_PORT", prefix)) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {}_PORT '{}'", prefix, raw);
            default_port
        }),
        None => default_port,
    };
    IntegrationHint { host, port }
}

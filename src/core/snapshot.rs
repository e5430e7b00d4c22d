//! Backend configuration snapshot and the status endpoint's wire shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::hints::EnvironmentHints;

/// Last-known-good backend configuration. Replaced wholesale, never patched in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    #[serde(alias = "llm_provider")]
    pub llm_provider: String,
    #[serde(alias = "llm_model")]
    pub llm_model: String,
    /// Provider id -> provider-specific settings, opaque to this crate.
    #[serde(alias = "llm_configs", default)]
    pub llm_configs: BTreeMap<String, Value>,
}

impl ConfigSnapshot {
    /// Copy of this snapshot pointing at a different provider/model; settings are kept.
    pub fn with_selection(&self, provider: &str, model: &str) -> Self {
        Self {
            llm_provider: provider.to_string(),
            llm_model: model.to_string(),
            llm_configs: self.llm_configs.clone(),
        }
    }
}

/// Body of the status endpoint, healthy or degraded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub onboarded: bool,
    #[serde(default)]
    pub config: Option<ConfigSnapshot>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_hints: Option<EnvironmentHints>,
}

impl StatusPayload {
    /// The gateway's answer when the backend could not be reached.
    pub fn degraded(error: String, env_hints: EnvironmentHints) -> Self {
        Self {
            onboarded: true,
            config: None,
            retryable: true,
            error: Some(error),
            env_hints: Some(env_hints),
        }
    }
}

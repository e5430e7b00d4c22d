//! Boundary layer in front of the backend.
//!
//! Makes one upstream attempt per request with the upstream budget and never leaves the
//! client empty-handed: an unreachable status endpoint becomes a retryable 503 carrying
//! environment hints, and a missing catalog becomes the fallback catalog.

mod routes;

pub use routes::serve;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::catalog::{ProvidersPayload, fallback_catalog};
use crate::core::config::{CONFIG_UPDATE_PATH, PROVIDERS_PATH, STATUS_PATH};
use crate::core::error::{SyncError, compact_error};
use crate::core::fetch::{FetchRequest, Transport, bounded_fetch};
use crate::core::hints::EnvironmentHints;
use crate::core::snapshot::StatusPayload;

/// Status code plus JSON body, independent of the HTTP framework.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryResponse {
    pub status: u16,
    pub body: Value,
}

impl BoundaryResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Body of the provider update command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub provider: String,
    pub model: String,
}

pub struct Gateway {
    upstream: Arc<dyn Transport>,
    timeout: Duration,
    env_hints: EnvironmentHints,
}

impl Gateway {
    pub fn new(upstream: Arc<dyn Transport>, timeout: Duration, env_hints: EnvironmentHints) -> Self {
        Self {
            upstream,
            timeout,
            env_hints,
        }
    }

    /// Pass a healthy status through; otherwise answer 503 with hints.
    pub async fn status(&self) -> BoundaryResponse {
        let request = FetchRequest::get(STATUS_PATH);
        match bounded_fetch(self.upstream.as_ref(), &request, self.timeout).await {
            Ok(res) if res.is_success() => match res.json::<Value>() {
                Ok(body) => BoundaryResponse::ok(body),
                Err(e) => self.degraded_status(e),
            },
            Ok(res) => self.degraded_status(SyncError::backend(res.status, &res.body)),
            Err(e) => self.degraded_status(e),
        }
    }

    fn degraded_status(&self, error: SyncError) -> BoundaryResponse {
        log::warn!("status upstream failed, serving environment hints: {}", error);
        let payload = StatusPayload::degraded(error.to_string(), self.env_hints.clone());
        BoundaryResponse {
            status: 503,
            body: serde_json::to_value(payload).unwrap_or_else(|_| json!({})),
        }
    }

    /// Pass a non-empty live catalog through; otherwise serve the fallback catalog as 200.
    pub async fn providers(&self) -> BoundaryResponse {
        let request = FetchRequest::get(PROVIDERS_PATH);
        let live = match bounded_fetch(self.upstream.as_ref(), &request, self.timeout).await {
            Ok(res) if res.is_success() => res.json::<ProvidersPayload>(),
            Ok(res) => Err(SyncError::backend(res.status, &res.body)),
            Err(e) => Err(e),
        };

        let payload = match live {
            Ok(payload) if !payload.providers.is_empty() => payload,
            Ok(_) => {
                log::info!("upstream listed no providers, serving fallback catalog");
                fallback_catalog().to_payload()
            }
            Err(e) => {
                log::warn!("providers upstream failed, serving fallback catalog: {}", e);
                fallback_catalog().to_payload()
            }
        };
        BoundaryResponse::ok(serde_json::to_value(payload).unwrap_or_else(|_| json!({"providers": []})))
    }

    /// Forward an update; the upstream status is returned as-is.
    pub async fn update_config(&self, update: &UpdateRequest) -> BoundaryResponse {
        let body = serde_json::to_value(update).unwrap_or_else(|_| json!({}));
        let request = FetchRequest::post(CONFIG_UPDATE_PATH, body);
        match bounded_fetch(self.upstream.as_ref(), &request, self.timeout).await {
            Ok(res) => {
                let body = serde_json::from_str::<Value>(&res.body).unwrap_or_else(|_| {
                    if res.is_success() {
                        json!({})
                    } else {
                        json!({ "error": compact_error(&res.body) })
                    }
                });
                BoundaryResponse {
                    status: res.status,
                    body,
                }
            }
            Err(e) => {
                log::warn!("config update upstream failed: {}", e);
                BoundaryResponse {
                    status: 502,
                    body: json!({ "error": e.to_string() }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ProviderCatalog;
    use crate::core::testing::{LIVE_PROVIDERS, READY_STATUS, Scripted, ScriptedTransport};

    fn gateway(transport: &Arc<ScriptedTransport>) -> Gateway {
        let upstream: Arc<dyn Transport> = transport.clone();
        let hints = EnvironmentHints::from_lookup(|k| (k == "LLM_PROVIDER").then(|| "openai".to_string()));
        Gateway::new(upstream, Duration::from_millis(12_000), hints)
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_status_passes_through() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(STATUS_PATH, Scripted::respond(200, READY_STATUS));

        let res = gateway(&transport).status().await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["config"]["llmProvider"], "openai");
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_status_becomes_retryable_503_with_hints() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(STATUS_PATH, Scripted::Hang);

        let started = tokio::time::Instant::now();
        let res = gateway(&transport).status().await;

        assert_eq!(started.elapsed(), Duration::from_millis(12_000));
        assert_eq!(res.status, 503);
        assert_eq!(res.body["onboarded"], true);
        assert!(res.body["config"].is_null());
        assert_eq!(res.body["retryable"], true);
        assert_eq!(res.body["error"], "request timed out after 12000 ms");
        assert_eq!(res.body["env_hints"]["llm_provider"], "openai");
        assert_eq!(transport.calls_to(STATUS_PATH), 1, "gateway does not retry");
    }

    #[tokio::test(start_paused = true)]
    async fn non_2xx_status_is_degraded() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(STATUS_PATH, Scripted::respond(500, r#"{"error":"db locked"}"#));

        let res = gateway(&transport).status().await;

        assert_eq!(res.status, 503);
        assert_eq!(res.body["error"], "backend error (500): db locked");
    }

    #[tokio::test(start_paused = true)]
    async fn live_providers_pass_through() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(PROVIDERS_PATH, Scripted::respond(200, LIVE_PROVIDERS));

        let res = gateway(&transport).providers().await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["providers"][0]["hasApiKey"], true);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_provider_list_is_replaced_by_fallback() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(PROVIDERS_PATH, Scripted::respond(200, r#"{"providers":[]}"#));

        let res = gateway(&transport).providers().await;

        assert_eq!(res.status, 200);
        let payload: ProvidersPayload = serde_json::from_value(res.body).unwrap();
        assert_eq!(&ProviderCatalog::new(payload.providers), fallback_catalog());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_providers_fetch_is_hidden_behind_fallback() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(
            PROVIDERS_PATH,
            Scripted::Fail(SyncError::Network("connection refused".into())),
        );

        let res = gateway(&transport).providers().await;

        assert_eq!(res.status, 200);
        let payload: ProvidersPayload = serde_json::from_value(res.body).unwrap();
        let catalog = ProviderCatalog::new(payload.providers);
        assert_eq!(catalog.ids(), vec!["anthropic", "openai", "google", "ollama"]);
        assert!(catalog.providers().iter().all(|p| !p.has_api_key));
    }

    #[tokio::test(start_paused = true)]
    async fn update_forwards_body_and_status() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(CONFIG_UPDATE_PATH, Scripted::respond(500, "boom"));
        let update = UpdateRequest {
            provider: "anthropic".into(),
            model: "claude-sonnet-4-6".into(),
        };

        let res = gateway(&transport).update_config(&update).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["error"], "boom");
        let sent = transport.requests().pop().unwrap();
        assert_eq!(sent.body.unwrap()["provider"], "anthropic");
    }

    #[tokio::test(start_paused = true)]
    async fn update_transport_failure_is_502() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.script(
            CONFIG_UPDATE_PATH,
            Scripted::Fail(SyncError::Network("reset".into())),
        );
        let update = UpdateRequest {
            provider: "openai".into(),
            model: "gpt-4o".into(),
        };

        let res = gateway(&transport).update_config(&update).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["error"], "network error: reset");
    }
}

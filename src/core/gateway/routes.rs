use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use super::{BoundaryResponse, Gateway, UpdateRequest};
use crate::core::app;
use crate::core::config::{CONFIG_UPDATE_PATH, PROVIDERS_PATH, STATUS_PATH};

impl IntoResponse for BoundaryResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.body)).into_response()
    }
}

fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(STATUS_PATH, get(status))
        .route(PROVIDERS_PATH, get(providers))
        .route(CONFIG_UPDATE_PATH, post(update_config))
        .with_state(gateway)
}

/// Bind `listen` and serve until the process is stopped.
pub async fn serve(gateway: Arc<Gateway>, listen: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(listen).await?;
    serve_on(listener, gateway).await
}

async fn serve_on(listener: TcpListener, gateway: Arc<Gateway>) -> std::io::Result<()> {
    log::info!("gateway listening on {}", listener.local_addr()?);
    axum::serve(listener, router(gateway)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": app::VERSION }))
}

async fn status(State(gateway): State<Arc<Gateway>>) -> BoundaryResponse {
    gateway.status().await
}

async fn providers(State(gateway): State<Arc<Gateway>>) -> BoundaryResponse {
    gateway.providers().await
}

async fn update_config(
    State(gateway): State<Arc<Gateway>>,
    Json(update): Json<UpdateRequest>,
) -> BoundaryResponse {
    gateway.update_config(&update).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::config::Timeouts;
    use crate::core::fetch::{FetchRequest, HttpTransport, Transport, bounded_fetch};
    use crate::core::hints::EnvironmentHints;
    use crate::core::error::SyncError;
    use crate::core::sequencer::{BootstrapState, ConfigSequencer};

    /// A local port with nothing listening on it.
    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    async fn spawn_gateway(backend_url: &str) -> String {
        let upstream: Arc<dyn Transport> = Arc::new(HttpTransport::new(backend_url));
        let hints = EnvironmentHints::from_lookup(|k| (k == "LLM_PROVIDER").then(|| "google".to_string()));
        let gateway = Arc::new(Gateway::new(upstream, Duration::from_secs(2), hints));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(serve_on(listener, gateway));
        url
    }

    #[tokio::test]
    async fn health_reports_version() {
        let url = spawn_gateway(&closed_port_url().await).await;
        let transport = HttpTransport::new(&url);

        let res = bounded_fetch(&transport, &FetchRequest::get("/health"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(res.status, 200);
        assert_eq!(res.json::<Value>().unwrap()["version"], app::VERSION);
    }

    #[tokio::test]
    async fn dead_backend_is_served_as_degraded_status_and_fallback_catalog() {
        let url = spawn_gateway(&closed_port_url().await).await;
        let transport = HttpTransport::new(&url);

        let status = bounded_fetch(&transport, &FetchRequest::get(STATUS_PATH), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(status.status, 503);
        let body: Value = status.json().unwrap();
        assert_eq!(body["retryable"], true);
        assert_eq!(body["env_hints"]["llm_provider"], "google");

        let providers = bounded_fetch(
            &transport,
            &FetchRequest::get(PROVIDERS_PATH),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(providers.status, 200);
        let body: Value = providers.json().unwrap();
        assert_eq!(body["providers"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn sequencer_degrades_against_gateway_with_hints() {
        let url = spawn_gateway(&closed_port_url().await).await;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&url));
        let timeouts = Timeouts {
            retry_delay: Duration::from_millis(10),
            ..Timeouts::default()
        };
        let sequencer = ConfigSequencer::new(transport, timeouts);

        let state = sequencer.bootstrap().await;

        let BootstrapState::Degraded(degraded) = &state else {
            panic!("expected degraded, got {}", state.label());
        };
        assert!(matches!(degraded.reason, SyncError::Backend { status: 503, .. }));
        assert_eq!(degraded.env_hints.as_ref().unwrap().llm_provider, "google");
        let catalog = sequencer.fetch_catalog().await.unwrap();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.providers().iter().all(|p| !p.has_api_key));
    }

    #[tokio::test]
    async fn malformed_update_body_is_rejected_before_forwarding() {
        let url = spawn_gateway(&closed_port_url().await).await;
        let transport = HttpTransport::new(&url);

        let res = bounded_fetch(
            &transport,
            &FetchRequest::post(CONFIG_UPDATE_PATH, json!({ "provider": "openai" })),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(res.status, 422);
    }
}

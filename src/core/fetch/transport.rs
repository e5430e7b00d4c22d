//! Transport seam: the only place that actually touches the network.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::error::SyncError;

use super::{FetchRequest, FetchResponse, Method};

/// Sends one request. `cancel` fires when the caller's deadline expires; implementations
/// should abandon the request when it does.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &FetchRequest,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, SyncError>;
}

/// `reqwest`-backed transport rooted at a base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &FetchRequest,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, SyncError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| SyncError::Network(e.to_string()))?;
            Ok(FetchResponse { status, body })
        };

        tokio::select! {
            result = exchange => result,
            _ = cancel.cancelled() => Err(SyncError::Network("request cancelled".to_string())),
        }
    }
}

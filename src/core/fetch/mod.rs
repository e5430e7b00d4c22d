//! Bounded fetch: one backend call with a hard deadline and its own cancellation token.

mod transport;

pub use transport::{HttpTransport, Transport};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::core::error::SyncError;

/// HTTP method subset used against the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request relative to the transport's base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl FetchRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            body: None,
        }
    }

    pub fn post(path: &str, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
        }
    }
}

/// Raw response; non-2xx statuses are still responses, not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON. Malformed payloads are a `Validation` failure.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        serde_json::from_str(&self.body)
            .map_err(|e| SyncError::Validation(format!("malformed response body: {}", e)))
    }
}

/// Issue `request` and give up after `timeout`.
///
/// A fresh token is created per call and cancelled when the deadline fires, so cancelling
/// one call never touches another. The deadline timer lives only inside this future and is
/// dropped on every exit path. No logging and no retry here: callers own both.
pub async fn bounded_fetch(
    transport: &dyn Transport,
    request: &FetchRequest,
    timeout: Duration,
) -> Result<FetchResponse, SyncError> {
    let token = CancellationToken::new();
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    tokio::select! {
        biased;
        result = transport.send(request, token.clone()) => result,
        _ = &mut deadline => {
            token.cancel();
            Err(SyncError::Timeout {
                after_ms: timeout.as_millis() as u64,
            })
        }
    }
}

//! Scripted transport used by unit tests in place of the network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::error::SyncError;
use crate::core::fetch::{FetchRequest, FetchResponse, Transport};

/// One scripted outcome for a path.
#[derive(Clone, Debug)]
pub enum Scripted {
    Respond { status: u16, body: String },
    /// Respond only after the given (simulated) delay.
    RespondAfter {
        delay: Duration,
        status: u16,
        body: String,
    },
    Fail(SyncError),
    /// Never answer; only the caller's deadline ends the call.
    Hang,
}

impl Scripted {
    pub fn respond(status: u16, body: &str) -> Self {
        Scripted::Respond {
            status,
            body: body.to_string(),
        }
    }

    pub fn respond_after(delay: Duration, status: u16, body: &str) -> Self {
        Scripted::RespondAfter {
            delay,
            status,
            body: body.to_string(),
        }
    }
}

/// Per-path queues of outcomes. The last outcome of a queue is sticky.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<FetchRequest>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, path: &str, outcome: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Number of requests sent to `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose cancellation token was fired by the caller.
    pub fn cancelled_calls(&self) -> usize {
        self.tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_cancelled())
            .count()
    }

    fn next_outcome(&self, path: &str) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &FetchRequest,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, SyncError> {
        self.calls.lock().unwrap().push(request.clone());
        self.tokens.lock().unwrap().push(cancel.clone());

        match self.next_outcome(&request.path) {
            Some(Scripted::Respond { status, body }) => Ok(FetchResponse { status, body }),
            Some(Scripted::RespondAfter {
                delay,
                status,
                body,
            }) => {
                tokio::time::sleep(delay).await;
                Ok(FetchResponse { status, body })
            }
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Hang) => {
                cancel.cancelled().await;
                Err(SyncError::Network("request cancelled".to_string()))
            }
            None => Err(SyncError::Network(format!(
                "no scripted response for {}",
                request.path
            ))),
        }
    }
}

pub const READY_STATUS: &str = r#"{
    "onboarded": true,
    "config": {
        "llmProvider": "openai",
        "llmModel": "gpt-4o",
        "llmConfigs": {"openai": {"temperature": 0.2}}
    }
}"#;

pub const LIVE_PROVIDERS: &str = r#"{
    "providers": [
        {"id": "anthropic", "name": "Anthropic", "models": ["claude-sonnet-4-6", "claude-haiku-4-5"], "hasApiKey": true},
        {"id": "openai", "name": "OpenAI", "models": ["gpt-4o"], "hasApiKey": true},
        {"id": "google", "name": "Google Gemini", "models": ["gemini-2.5-pro"], "hasApiKey": false},
        {"id": "ollama", "name": "Ollama (local)", "models": [], "hasApiKey": true}
    ]
}"#;

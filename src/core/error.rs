//! Error taxonomy shared by fetches, the bootstrap sequencer, and the gateway.

use serde::Deserialize;

/// Failures talking to the configuration backend.
///
/// `Clone` because the last failure is carried inside published state
/// (`BootstrapState::Degraded`, `SwitchError::Update`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The bounded fetch deadline fired before a response arrived.
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
    /// Transport or connection-level failure.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status.
    #[error("backend error ({status}): {reason}")]
    Backend { status: u16, reason: String },
    /// The backend answered 2xx but the payload was malformed or incomplete.
    #[error("invalid response: {0}")]
    Validation(String),
}

impl SyncError {
    /// Build a `Backend` error from a status code and raw body.
    pub fn backend(status: u16, body: &str) -> Self {
        SyncError::Backend {
            status,
            reason: compact_error(body),
        }
    }
}

/// Reduce an error body to a single readable line.
///
/// Understands `{"error": "..."}` and `{"error": {"message": "..."}}`; anything else is
/// returned trimmed (or a placeholder when empty).
pub fn compact_error(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorRoot {
        error: Option<ErrorField>,
    }
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Text(String),
        Object { message: Option<String> },
    }

    if let Ok(root) = serde_json::from_str::<ErrorRoot>(body)
        && let Some(field) = root.error
    {
        match field {
            ErrorField::Text(msg) => return msg,
            ErrorField::Object {
                message: Some(msg),
            } => return msg,
            ErrorField::Object { message: None } => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(empty body)".to_string()
    } else {
        trimmed.to_string()
    }
}

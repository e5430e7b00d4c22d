use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Status endpoint (onboarding flag + active configuration).
pub const STATUS_PATH: &str = "/api/status";
/// Provider catalog endpoint.
pub const PROVIDERS_PATH: &str = "/api/providers";
/// Provider/model update command.
pub const CONFIG_UPDATE_PATH: &str = "/api/config/provider";

const DEFAULT_SYNC_URL: &str = "http://127.0.0.1:4100";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_LISTEN: &str = "127.0.0.1:4100";

/// Time budgets for every backend interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Status fetch; generous enough for a backend cold start.
    pub status: Duration,
    /// UI-facing catalog fetch.
    pub catalog: Duration,
    /// Gateway -> backend calls.
    pub upstream: Duration,
    /// Provider/model update command.
    pub update: Duration,
    /// Delay before the single status retry.
    pub retry_delay: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            status: Duration::from_millis(12_000),
            catalog: Duration::from_millis(5_000),
            upstream: Duration::from_millis(12_000),
            update: Duration::from_millis(12_000),
            retry_delay: Duration::from_millis(8_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL the client side talks to (normally the gateway).
    pub sync_url: String,
    /// Backend the gateway fronts.
    pub backend_url: String,
    /// Gateway listen address.
    pub listen: SocketAddr,
    pub timeouts: Timeouts,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDuration { var: &'static str, value: String },
    InvalidListen(String),
    EmptyUrl(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidDuration { var, value } => {
                write!(f, "{} must be a number of milliseconds, got '{}'", var, value)
            }
            ConfigError::InvalidListen(value) => {
                write!(f, "LLM_SYNC_LISTEN must be an address like 127.0.0.1:4100, got '{}'", value)
            }
            ConfigError::EmptyUrl(var) => write!(f, "{} must not be empty", var),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from the environment.
pub fn load() -> Result<Config, ConfigError> {
    load_from(|key| env::var(key).ok())
}

/// Load configuration from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let sync_url = url_var(&lookup, "LLM_SYNC_URL", DEFAULT_SYNC_URL)?;
    let backend_url = url_var(&lookup, "LLM_SYNC_BACKEND_URL", DEFAULT_BACKEND_URL)?;

    let listen_raw = lookup("LLM_SYNC_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let listen = listen_raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidListen(listen_raw.clone()))?;

    let defaults = Timeouts::default();
    let timeouts = Timeouts {
        status: millis_var(&lookup, "LLM_SYNC_STATUS_TIMEOUT_MS", defaults.status)?,
        catalog: millis_var(&lookup, "LLM_SYNC_CATALOG_TIMEOUT_MS", defaults.catalog)?,
        upstream: millis_var(&lookup, "LLM_SYNC_UPSTREAM_TIMEOUT_MS", defaults.upstream)?,
        update: millis_var(&lookup, "LLM_SYNC_UPDATE_TIMEOUT_MS", defaults.update)?,
        retry_delay: millis_var(&lookup, "LLM_SYNC_RETRY_DELAY_MS", defaults.retry_delay)?,
    };

    Ok(Config {
        sync_url,
        backend_url,
        listen,
        timeouts,
    })
}

fn url_var<F>(lookup: &F, var: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyUrl(var)),
        Some(v) => Ok(v.trim().trim_end_matches('/').to_string()),
        None => Ok(default.to_string()),
    }
}

fn millis_var<F>(lookup: &F, var: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidDuration { var, value: v }),
        None => Ok(default),
    }
}

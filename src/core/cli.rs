//! CLI-only commands: status, providers, switch, hints, config info.
//!
//! These run a short-lived sequencer against the sync URL and produce plain text output.

use std::sync::Arc;

use crate::core::catalog::{
    self, ProviderCatalog, fallback_catalog, is_fallback_catalog, load_cached_catalog,
    save_catalog_to_cache,
};
use crate::core::config::Config;
use crate::core::fetch::{HttpTransport, Transport};
use crate::core::hints::EnvironmentHints;
use crate::core::paths;
use crate::core::sequencer::{BootstrapState, ConfigSequencer};
use crate::core::switch::ProviderSwitch;
use crate::core::view::{self, ProviderOption, ViewSource};

/// Where the catalog on display came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Live,
    Cached,
    BuiltIn,
}

impl CatalogSource {
    fn label(self) -> &'static str {
        match self {
            CatalogSource::Live => "live",
            CatalogSource::Cached => "cached",
            CatalogSource::BuiltIn => "built-in",
        }
    }
}

/// Sequencer pointed at the sync URL, with its catalog seeded from cache or the built-in list.
pub fn connect(config: &Config) -> (Arc<ConfigSequencer>, CatalogSource) {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.sync_url));
    let sequencer = Arc::new(ConfigSequencer::new(transport, config.timeouts));
    let source = match load_cached_catalog() {
        Some(cached) if !cached.is_empty() => {
            sequencer.seed_catalog(cached);
            CatalogSource::Cached
        }
        _ => {
            sequencer.seed_catalog(fallback_catalog().clone());
            CatalogSource::BuiltIn
        }
    };
    (sequencer, source)
}

/// Cache a freshly received catalog unless it is the built-in list the gateway substitutes
/// when the backend is down.
pub fn remember_catalog(catalog: &ProviderCatalog) -> CatalogSource {
    if is_fallback_catalog(catalog) {
        log::info!("received the built-in provider list; not caching it");
        return CatalogSource::BuiltIn;
    }
    if let Err(e) = save_catalog_to_cache(catalog) {
        log::warn!("could not cache provider catalog: {}", e);
    }
    CatalogSource::Live
}

/// Fetch the live catalog; on success it is cached, on failure the seeded one is kept.
pub async fn refresh_catalog(sequencer: &ConfigSequencer, seeded: CatalogSource) -> CatalogSource {
    match sequencer.fetch_catalog().await {
        Ok(catalog) => remember_catalog(&catalog),
        Err(e) => {
            log::warn!("provider catalog unavailable, using {} list: {}", seeded.label(), e);
            seeded
        }
    }
}

/// Human-readable lines describing a bootstrap state.
pub fn describe_state(state: &BootstrapState, catalog: &ProviderCatalog) -> Vec<String> {
    let mut lines = vec![format!("State:     {}", state.label())];
    match state {
        BootstrapState::Ready {
            snapshot,
            onboarded,
        } => {
            let display = view::active_display(snapshot, catalog);
            let unlisted = if display.listed { "" } else { " (not in catalog)" };
            lines.push(format!("Provider:  {}{}", display.provider_label, unlisted));
            lines.push(format!("Model:     {}", display.model));
            lines.push(format!("Onboarded: {}", if *onboarded { "yes" } else { "no" }));
        }
        BootstrapState::Degraded(degraded) => {
            lines.push(format!("Reason:    {}", degraded.reason));
            let settings = view::settings_view(state);
            if settings.source == ViewSource::Advisory {
                lines.push(format!(
                    "Suggested: {} / {} (from environment, not confirmed)",
                    settings.provider.as_deref().unwrap_or("-"),
                    settings.model.as_deref().unwrap_or("-")
                ));
            }
        }
        BootstrapState::Loading => {}
    }
    lines
}

/// Run the `status` command: bootstrap once and print the outcome.
pub async fn run_status(config: &Config) {
    let (sequencer, _) = connect(config);
    let state = sequencer.bootstrap().await;
    for line in describe_state(&state, &sequencer.catalog()) {
        println!("{}", line);
    }
    if state.is_degraded() {
        std::process::exit(1);
    }
}

/// Run the `providers` command: list the catalog with selectability.
pub async fn run_providers(config: &Config, query: Option<&str>) {
    let (sequencer, seeded) = connect(config);
    let source = refresh_catalog(&sequencer, seeded).await;
    let catalog = sequencer.catalog();

    let shown = catalog::filter_providers(&catalog, query.unwrap_or(""));
    let options = view::provider_options(&shown);
    if options.is_empty() {
        println!("No providers found.");
        return;
    }

    let id_w = options.iter().map(|o| o.id.len()).max().unwrap_or(10).max(10);
    let name_w = options.iter().map(|o| o.name.len()).max().unwrap_or(16).max(16);
    println!("{:id_w$}  {:name_w$}  {:9}  MODELS", "ID", "NAME", "STATUS");
    for o in &options {
        println!(
            "{:id_w$}  {:name_w$}  {:9}  {}",
            o.id,
            o.name,
            availability(o),
            o.models.join(", ")
        );
    }
    println!();
    println!("{} provider(s), {} catalog", options.len(), source.label());
}

fn availability(option: &ProviderOption) -> &'static str {
    if option.enabled {
        "ready"
    } else if option.models.is_empty() {
        "no models"
    } else {
        "no key"
    }
}

/// Run the `switch` command: select a provider and commit a model.
pub async fn run_switch(config: &Config, provider: &str, model: &str) {
    let (sequencer, seeded) = connect(config);
    let (state, source) = tokio::join!(sequencer.bootstrap(), refresh_catalog(&sequencer, seeded));
    if source != CatalogSource::Live {
        log::info!("switching against the {} catalog", source.label());
    }
    let catalog = sequencer.catalog();

    let mut switch = ProviderSwitch::new();
    switch.open();
    if !switch.select_provider(&catalog, provider) {
        let why = match catalog.get(provider) {
            None => "is not listed",
            Some(p) if !p.has_api_key => "has no API key configured",
            Some(_) => "offers no models",
        };
        eprintln!("Error: provider '{}' {}", provider, why);
        std::process::exit(1);
    }

    match switch.select_model(model, &catalog, &sequencer).await {
        Ok(()) => {
            if !state.is_ready() {
                log::info!("backend status was {} before the switch", state.label());
            }
            for line in describe_state(&sequencer.state(), &catalog) {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the `hints` command: print environment hints as JSON.
pub fn run_hints() {
    let hints = EnvironmentHints::from_env();
    match serde_json::to_string_pretty(&hints) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the `config` command: display paths, endpoints, and time budgets.
pub fn run_config(config: &Config) {
    let config_dir = paths::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let cache_dir = paths::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let t = &config.timeouts;

    println!("Config:      {}", config_dir);
    println!("Cache:       {}", cache_dir);
    println!("Sync URL:    {}", config.sync_url);
    println!("Backend URL: {}", config.backend_url);
    println!("Listen:      {}", config.listen);
    println!(
        "Timeouts:    status {} ms, catalog {} ms, upstream {} ms, update {} ms",
        t.status.as_millis(),
        t.catalog.as_millis(),
        t.upstream.as_millis(),
        t.update.as_millis()
    );
    println!("Retry delay: {} ms", t.retry_delay.as_millis());
}

//! Compiled-in provider list used when the live catalog cannot be obtained.
//!
//! Loaded from `config/fallback-providers.json` (embedded at compile time, validated by build.rs).

use std::sync::OnceLock;

use super::{ProviderCatalog, ProviderDescriptor};

fn load_fallback_catalog() -> ProviderCatalog {
    let json = include_str!("../../../config/fallback-providers.json");
    let entries: Vec<ProviderDescriptor> =
        serde_json::from_str(json).expect("fallback-providers.json must be valid");
    ProviderCatalog::new(entries)
}

static FALLBACK_CATALOG: OnceLock<ProviderCatalog> = OnceLock::new();

/// Known providers with default model lists, all without credentials.
pub fn fallback_catalog() -> &'static ProviderCatalog {
    FALLBACK_CATALOG.get_or_init(load_fallback_catalog)
}

/// True when `catalog` is the built-in list, e.g. substituted by the gateway. Such a
/// catalog carries no credentials and must not be cached as a live one.
pub fn is_fallback_catalog(catalog: &ProviderCatalog) -> bool {
    catalog.providers().iter().all(|p| !p.has_api_key) && catalog == fallback_catalog()
}

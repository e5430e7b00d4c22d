//! 24h on-disk cache of the last live provider catalog.

use super::ProviderCatalog;
use crate::core::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours

#[derive(Serialize, Deserialize)]
struct CachedCatalog {
    fetched_at: u64,
    providers: ProviderCatalog,
}

fn cache_path() -> Option<PathBuf> {
    paths::cache_dir().map(|d| d.join("providers.json"))
}

fn now_secs() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Load the cached catalog if fresh (< 24h). Returns None on miss or expiry.
pub fn load_cached_catalog() -> Option<ProviderCatalog> {
    load_from(&cache_path()?, now_secs()?)
}

/// Save the catalog to the cache directory.
pub fn save_catalog_to_cache(catalog: &ProviderCatalog) -> io::Result<()> {
    let path = cache_path().ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No cache dir"))?;
    let now = now_secs().ok_or_else(|| io::Error::other("system clock before UNIX epoch"))?;
    save_to(&path, catalog, now)
}

fn load_from(path: &Path, now: u64) -> Option<ProviderCatalog> {
    let data = fs::read_to_string(path).ok()?;
    let cached: CachedCatalog = serde_json::from_str(&data).ok()?;
    let age_secs = now.saturating_sub(cached.fetched_at);
    if age_secs < CACHE_TTL.as_secs() && !cached.providers.is_empty() {
        Some(cached.providers)
    } else {
        None
    }
}

fn save_to(path: &Path, catalog: &ProviderCatalog, now: u64) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let cached = CachedCatalog {
        fetched_at: now,
        providers: catalog.clone(),
    };
    let json = serde_json::to_string_pretty(&cached)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

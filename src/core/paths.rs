//! Platform directories for config and the provider catalog cache.

use std::path::PathBuf;

use crate::core::app;

pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/llm-sync/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/llm-sync/). `LLM_SYNC_CACHE_DIR` overrides it.
pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LLM_SYNC_CACHE_DIR")
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

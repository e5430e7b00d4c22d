//! Build script: validates fallback-providers.json at compile time.

use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "fallback-providers.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", config_path.display());
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. fallback-providers.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    #[allow(dead_code)]
    struct FallbackProviderEntry {
        id: String,
        name: String,
        models: Vec<String>,
        #[serde(rename = "hasApiKey")]
        has_api_key: bool,
    }
    let entries: Vec<FallbackProviderEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "fallback-providers.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    for entry in &entries {
        if entry.has_api_key {
            panic!(
                "fallback provider '{}' must have hasApiKey=false (no credentials are known offline)",
                entry.id
            );
        }
        if entry.models.is_empty() {
            panic!("fallback provider '{}' must list at least one model", entry.id);
        }
    }
    let mut ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != entries.len() {
        panic!("fallback-providers.json contains duplicate provider ids");
    }
}

//! Provider catalog: the set of selectable LLM providers and their models.

mod cache;
mod fallback;

pub use cache::{load_cached_catalog, save_catalog_to_cache};
pub use fallback::{fallback_catalog, is_fallback_catalog};

use serde::{Deserialize, Serialize};

/// One selectable provider. `has_api_key == false` means listed but not selectable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(rename = "hasApiKey", alias = "has_api_key", default)]
    pub has_api_key: bool,
}

impl ProviderDescriptor {
    /// Selectable only with credentials and at least one model.
    pub fn is_selectable(&self) -> bool {
        self.has_api_key && !self.models.is_empty()
    }

    pub fn offers_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

/// Wire shape of the providers endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProvidersPayload {
    #[serde(default)]
    pub providers: Vec<ProviderDescriptor>,
}

/// Providers keyed by id, kept in the order the backend listed them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProviderDescriptor>", into = "Vec<ProviderDescriptor>")]
pub struct ProviderCatalog {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderCatalog {
    /// Build from a list; later duplicates of an id are dropped.
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Self {
        let mut providers: Vec<ProviderDescriptor> = Vec::with_capacity(descriptors.len());
        for d in descriptors {
            if providers.iter().any(|p| p.id == d.id) {
                log::debug!("duplicate provider id '{}' in catalog ignored", d.id);
                continue;
            }
            providers.push(d);
        }
        Self { providers }
    }

    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    pub fn ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn to_payload(&self) -> ProvidersPayload {
        ProvidersPayload {
            providers: self.providers.clone(),
        }
    }
}

impl From<Vec<ProviderDescriptor>> for ProviderCatalog {
    fn from(descriptors: Vec<ProviderDescriptor>) -> Self {
        Self::new(descriptors)
    }
}

impl From<ProviderCatalog> for Vec<ProviderDescriptor> {
    fn from(catalog: ProviderCatalog) -> Self {
        catalog.providers
    }
}

/// Providers whose id or display name contains `query`, ignoring case. A blank query
/// keeps the whole catalog.
pub fn filter_providers(catalog: &ProviderCatalog, query: &str) -> ProviderCatalog {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return catalog.clone();
    }
    let providers = catalog
        .providers()
        .iter()
        .filter(|p| p.id.to_lowercase().contains(&query) || p.name.to_lowercase().contains(&query))
        .cloned()
        .collect();
    ProviderCatalog { providers }
}

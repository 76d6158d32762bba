//! JSON site definition.
//!
//! ```json
//! {
//!   "settings": { "site_url": "https://example.com" },
//!   "languages": [
//!     { "slug": "de", "locale": "de_DE", "name": "Deutsch" },
//!     { "slug": "en", "locale": "en_US", "name": "English" }
//!   ],
//!   "type_overrides": { "book": { "en": { "rewrite_slug": "books" } } },
//!   "entities": [ { "id": 1, "content_type": "post", "slug": "hallo" } ]
//! }
//! ```

use crate::content::{ContentStore, ContentTypes, Entity, InMemoryContentStore, TypeRouteOverrides};
use crate::i18n::TextDirection;
use crate::routes::RouteRule;
use crate::site::{Site, SiteSettings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    pub slug: String,
    pub locale: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TextDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDefinition {
    pub settings: SiteSettings,

    /// In registration order; the first one is the default language
    pub languages: Vec<LanguageDefinition>,

    #[serde(default = "ContentTypes::builtin")]
    pub content_types: ContentTypes,

    #[serde(default)]
    pub type_overrides: TypeRouteOverrides,

    /// Host base route table; the standard routes are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteRule>>,

    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl SiteDefinition {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site file {}", path.display()))?;
        let definition: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse site file {}", path.display()))?;

        info!(
            "Loaded site file {} ({} languages, {} entities)",
            path.display(),
            definition.languages.len(),
            definition.entities.len()
        );
        Ok(definition)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize site definition")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write site file {}", path.display()))?;
        Ok(())
    }

    /// Build the site over an in-memory store holding the entities.
    pub fn into_site(self, cache_capacity: usize) -> Result<Site> {
        let store = InMemoryContentStore::from_entities(self.entities)
            .context("Invalid entity hierarchy in site file")?;

        let mut builder = Site::builder(self.settings)
            .content_types(self.content_types)
            .type_overrides(self.type_overrides)
            .store(Arc::new(store))
            .cache_capacity(cache_capacity);
        for language in &self.languages {
            builder = builder.language_with_direction(
                &language.slug,
                &language.locale,
                &language.name,
                language.direction,
            );
        }
        if let Some(routes) = self.routes {
            builder = builder.base_routes(routes);
        }

        builder.build().context("Invalid site configuration")
    }

    /// Replace the entity list with the current contents of `site`'s store.
    pub fn refresh_entities(&mut self, site: &Site) {
        let store = site.store();
        self.entities = store
            .entity_ids()
            .into_iter()
            .filter_map(|id| store.get_entity(id))
            .collect();
    }
}

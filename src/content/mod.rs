//! Routable content: entities, content types and the store interface.
//!
//! - `types`: Content type definitions and per-language route slug overrides
//! - `store`: `ContentStore`, the read interface the routing core consumes
//! - `memory`: In-memory `ContentStore` used by the server and tests

mod memory;
mod store;
mod types;

pub use memory::InMemoryContentStore;
pub use store::ContentStore;
pub use types::{ContentTypeDef, ContentTypes, RouteSlugOverride, TypeKind, TypeRouteOverrides};

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Arena-style identifier of a content entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Published,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
}

impl Status {
    /// Only published content can be reached through a URL.
    pub fn is_published(self) -> bool {
        self == Status::Published
    }
}

/// One routable content object (post, page, custom type item, taxonomy term).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,

    /// Name of the content type (e.g., "post", "page", "category")
    pub content_type: String,

    #[serde(default)]
    pub parent_id: Option<EntityId>,

    /// Storage slug, mirrors the default-language slug
    pub slug: String,

    #[serde(default)]
    pub title: String,

    /// Per-language slug overrides (sparse)
    #[serde(default)]
    pub slugs: BTreeMap<String, Option<String>>,

    /// Per-language visibility; missing entries are visible
    #[serde(default)]
    pub visibility: BTreeMap<String, bool>,

    #[serde(default)]
    pub status: Status,
}

impl Entity {
    pub fn new(id: u64, content_type: &str, slug: &str) -> Self {
        Self {
            id: EntityId(id),
            content_type: content_type.to_string(),
            parent_id: None,
            slug: slug.to_string(),
            title: String::new(),
            slugs: BTreeMap::new(),
            visibility: BTreeMap::new(),
            status: Status::Published,
        }
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_slug(mut self, language: &str, slug: &str) -> Self {
        self.slugs.insert(language.to_string(), Some(slug.to_string()));
        self
    }

    pub fn hidden_in(mut self, language: &str) -> Self {
        self.visibility.insert(language.to_string(), false);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Explicit, non-empty slug override for a language.
    pub fn slug_override(&self, language: &str) -> Option<&str> {
        self.slugs
            .get(language)
            .and_then(|slug| slug.as_deref())
            .filter(|slug| !slug.is_empty())
    }

    /// Slug used in URLs of `language`.
    ///
    /// The default language always uses the storage slug. Other languages use
    /// their override, falling back to the storage slug when untranslated.
    pub fn effective_slug(&self, language: &Language) -> &str {
        if language.is_default() {
            return &self.slug;
        }
        self.slug_override(language.slug())
            .unwrap_or(self.slug.as_str())
    }

    /// Check if the entity may be linked in `language`. The default language
    /// is always visible.
    pub fn is_visible_in(&self, language: &Language) -> bool {
        language.is_default() || self.visibility.get(language.slug()).copied().unwrap_or(true)
    }
}

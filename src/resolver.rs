//! URL to entity resolution.
//!
//! Pipeline: strip the site address, detect the URL's language, look up the
//! cache, match the route table, then find the entity by its slug path.

use crate::cache::{CacheKey, CachedResolution};
use crate::content::{ContentTypeDef, Entity, TypeKind};
use crate::i18n::{Language, LanguageDetector};
use crate::routes::{QueryVars, RouteTable};
use crate::site::Site;
use crate::url::{join_segments, path_segments};
use std::sync::Arc;
use tracing::debug;

/// What a URL addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Entity(Entity),
    /// Archive page of a post type
    Archive { content_type: String },
    NotFound,
}

impl Resolution {
    pub fn entity(self) -> Option<Entity> {
        match self {
            Resolution::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Resolution together with the language the URL is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub language: Language,
    pub resolution: Resolution,
}

pub struct UrlResolver<'a> {
    site: &'a Site,
    routes: Arc<RouteTable>,
}

impl<'a> UrlResolver<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            routes: site.routes(),
        }
    }

    /// Resolve a URL to the published entity it addresses.
    pub fn resolve(&self, url: &str, detector: &mut LanguageDetector) -> Option<Entity> {
        self.resolve_target(url, detector)?.resolution.entity()
    }

    /// Resolve a URL to an entity, an archive or nothing.
    ///
    /// # Returns
    /// * `None` for URLs outside the site and for the bare site root
    pub fn resolve_target(&self, url: &str, detector: &mut LanguageDetector) -> Option<ResolvedUrl> {
        let segments = self.site.site_url().relative_segments(url)?;
        if segments.is_empty() {
            return None;
        }

        let language = self
            .site
            .registry()
            .get(&segments[0])
            .unwrap_or(self.site.default_language())
            .clone();
        let path = join_segments(&segments);

        let resolution = detector
            .with_language(language.slug(), |_| self.resolve_in(&path, &language))
            .ok()?;

        Some(ResolvedUrl {
            language,
            resolution,
        })
    }

    /// Resolve a normalized path in a known language, through the cache.
    pub fn resolve_in(&self, path: &str, language: &Language) -> Resolution {
        let store = self.site.store();
        let cache = self.site.cache();
        let metrics = self.site.metrics();
        let key = CacheKey::new(path, language.slug(), store.current_content_version());

        metrics.record_resolution();
        match cache.get(&key) {
            Some(CachedResolution::Entity(id)) => {
                if let Some(entity) = store.get_entity(id).filter(|e| e.status.is_published()) {
                    metrics.record_cache_hit();
                    debug!(path, language = language.slug(), entity = %id, "Resolution cache hit");
                    return Resolution::Entity(entity);
                }
                debug!(path, entity = %id, "Cached entity is gone, resolving again");
                metrics.record_cache_miss();
            }
            Some(CachedResolution::Archive(content_type)) => {
                metrics.record_cache_hit();
                return Resolution::Archive { content_type };
            }
            Some(CachedResolution::NotFound) => {
                metrics.record_cache_hit();
                metrics.record_not_found();
                return Resolution::NotFound;
            }
            None => {
                metrics.record_cache_miss();
                debug!(path, language = language.slug(), "Resolution cache miss");
            }
        }

        let resolution = self.compute(path, language);
        let cached = match &resolution {
            Resolution::Entity(entity) => CachedResolution::Entity(entity.id),
            Resolution::Archive { content_type } => CachedResolution::Archive(content_type.clone()),
            Resolution::NotFound => {
                metrics.record_not_found();
                CachedResolution::NotFound
            }
        };
        cache.put(key, cached);
        resolution
    }

    fn compute(&self, path: &str, language: &Language) -> Resolution {
        let Some(matched) = self.routes.match_path(path) else {
            return Resolution::NotFound;
        };

        let types = self.site.content_types();
        if let Some((var, value)) = item_var(types.iter(), &matched.vars) {
            let segments = path_segments(value);
            for def in types.candidates_for_var(var) {
                if let Some(entity) = self.find_entity(def, &segments, language) {
                    return Resolution::Entity(entity);
                }
            }
            return Resolution::NotFound;
        }

        match matched.vars.get("post_type").and_then(|name| types.get(name)) {
            Some(def) if def.kind == TypeKind::PostType => Resolution::Archive {
                content_type: def.name.clone(),
            },
            _ => Resolution::NotFound,
        }
    }

    /// Find a published entity of `def` by its slug path.
    ///
    /// A single global match on the leaf slug is taken directly when its
    /// ancestor chain spells the same path; anything else walks the tree
    /// from the root.
    fn find_entity(&self, def: &ContentTypeDef, segments: &[String], language: &Language) -> Option<Entity> {
        let store = self.site.store();
        let leaf = segments.last()?;

        let matches = store.find_by_leaf_slug(&def.name, language, leaf);
        match matches.as_slice() {
            [] => return None,
            [only] => {
                if store.slug_path(only, language) == segments {
                    return Some(only.clone()).filter(|e| e.status.is_published());
                }
            }
            _ => {}
        }

        let mut found: Option<Entity> = None;
        for segment in segments {
            let parent = found.as_ref().map(|entity| entity.id);
            found = Some(store.find_children(parent, &def.name, language, segment)?);
        }
        found.filter(|entity| entity.status.is_published())
    }
}

/// The query variable naming an item, checked in type definition order.
fn item_var<'t, 'v>(
    mut types: impl Iterator<Item = &'t ContentTypeDef>,
    vars: &'v QueryVars,
) -> Option<(&'t str, &'v str)> {
    types.find_map(|def| {
        vars.get(&def.query_var)
            .map(|value| (def.query_var.as_str(), value.as_str()))
    })
}

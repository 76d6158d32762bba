//! The `Site` facade: one configured multilingual site.
//!
//! Owns the language registry, content types, the content store handle,
//! the compiled route table, the resolution cache and the metrics, and hands
//! out the per-call components (detector, resolver, permalink builder,
//! converter) that borrow from it.

use crate::cache::ResolutionCache;
use crate::content::{ContentStore, ContentTypes, Entity, EntityId, TypeRouteOverrides};
use crate::converter::UrlConverter;
use crate::error::{ConfigurationError, RoutingError};
use crate::i18n::{Language, LanguageDetector, LanguageRegistry, RequestInfo, TextDirection};
use crate::metrics::ResolutionMetrics;
use crate::permalink::PermalinkBuilder;
use crate::resolver::UrlResolver;
use crate::routes::{
    RouteProvider, RouteTable, RouteTableTransformer, RouteTableValidator, StandardRoutes,
    ValidationReport,
};
use crate::slug::{sanitize_slug, ReservedSlugs, SlugPolicy, SlugScope, SlugUniquenessResolver};
use crate::url::SiteUrl;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, warn};

fn default_true() -> bool {
    true
}

fn default_pagination_base() -> String {
    "page".to_string()
}

fn default_feed_names() -> Vec<String> {
    ["feed", "rdf", "rss", "rss2", "atom"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_asset_path_prefixes() -> Vec<String> {
    vec!["wp-content".to_string(), "wp-includes".to_string()]
}

fn default_admin_path() -> String {
    "wp-admin".to_string()
}

/// Site-wide routing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Absolute site address (e.g., "https://example.com")
    pub site_url: String,

    /// Entity shown at the site root
    #[serde(default)]
    pub front_page: Option<EntityId>,

    #[serde(default = "default_true")]
    pub trailing_slash: bool,

    #[serde(default = "default_pagination_base")]
    pub pagination_base: String,

    #[serde(default = "default_feed_names")]
    pub feed_names: Vec<String>,

    /// Link target for entities hidden in a language; the language's home
    /// URL when unset
    #[serde(default)]
    pub visibility_fallback: Option<String>,

    /// First path segments that are never translated
    #[serde(default = "default_asset_path_prefixes")]
    pub asset_path_prefixes: Vec<String>,

    #[serde(default = "default_admin_path")]
    pub admin_path: String,

    /// Additional words no root-level slug may take
    #[serde(default)]
    pub extra_reserved_slugs: Vec<String>,
}

impl SiteSettings {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.to_string(),
            front_page: None,
            trailing_slash: true,
            pagination_base: default_pagination_base(),
            feed_names: default_feed_names(),
            visibility_fallback: None,
            asset_path_prefixes: default_asset_path_prefixes(),
            admin_path: default_admin_path(),
            extra_reserved_slugs: Vec::new(),
        }
    }
}

/// Outcome of a `resave_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResaveReport {
    pub saved: usize,
    pub failed: Vec<(EntityId, String)>,
}

struct LanguageSpec {
    slug: String,
    locale_tag: String,
    display_name: String,
    direction: Option<TextDirection>,
}

/// Builder for `Site`.
pub struct SiteBuilder {
    settings: SiteSettings,
    languages: Vec<LanguageSpec>,
    types: ContentTypes,
    overrides: TypeRouteOverrides,
    store: Option<Arc<dyn ContentStore>>,
    provider: Option<Box<dyn RouteProvider>>,
    cache_capacity: usize,
    policy: Option<Arc<dyn SlugPolicy>>,
}

impl SiteBuilder {
    pub fn new(settings: SiteSettings) -> Self {
        Self {
            settings,
            languages: Vec::new(),
            types: ContentTypes::builtin(),
            overrides: TypeRouteOverrides::new(),
            store: None,
            provider: None,
            cache_capacity: ResolutionCache::DEFAULT_CAPACITY,
            policy: None,
        }
    }

    /// Add a language. The first one added is the default language.
    pub fn language(self, slug: &str, locale_tag: &str, display_name: &str) -> Self {
        self.language_with_direction(slug, locale_tag, display_name, None)
    }

    /// Add a language with an explicit text direction (`None` infers it from
    /// the locale).
    pub fn language_with_direction(
        mut self,
        slug: &str,
        locale_tag: &str,
        display_name: &str,
        direction: Option<TextDirection>,
    ) -> Self {
        self.languages.push(LanguageSpec {
            slug: slug.to_string(),
            locale_tag: locale_tag.to_string(),
            display_name: display_name.to_string(),
            direction,
        });
        self
    }

    pub fn content_types(mut self, types: ContentTypes) -> Self {
        self.types = types;
        self
    }

    pub fn type_overrides(mut self, overrides: TypeRouteOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a host-supplied base route table instead of `StandardRoutes`.
    pub fn base_routes(mut self, provider: impl RouteProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn slug_policy(mut self, policy: Arc<dyn SlugPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Register the languages, validate the configuration and compile the
    /// route table.
    pub fn build(self) -> Result<Site, ConfigurationError> {
        let site_url = SiteUrl::parse(&self.settings.site_url)?;

        let mut registry = LanguageRegistry::new();
        for spec in &self.languages {
            match spec.direction {
                Some(direction) => registry.register_with_direction(
                    &spec.slug,
                    &spec.locale_tag,
                    &spec.display_name,
                    direction,
                )?,
                None => registry.register(&spec.slug, &spec.locale_tag, &spec.display_name)?,
            };
        }
        let default_language = registry.default()?.clone();

        let provider = match self.provider {
            Some(provider) => provider,
            None => Box::new(StandardRoutes::new(
                &self.types,
                &self.settings.pagination_base,
                &self.settings.feed_names,
            )),
        };

        let store = match self.store {
            Some(store) => store,
            None => Arc::new(crate::content::InMemoryContentStore::new()),
        };

        let reserved = ReservedSlugs::new(&registry, &self.settings.feed_names)
            .with_extra(&self.settings.extra_reserved_slugs);

        let mut slugs = SlugUniquenessResolver::new(&self.settings.pagination_base);
        if let Some(policy) = self.policy {
            slugs = slugs.with_policy(policy);
        }

        let site = Site {
            settings: self.settings,
            site_url: Arc::new(site_url),
            registry: Arc::new(registry),
            default_language,
            types: self.types,
            overrides: self.overrides,
            store,
            provider,
            routes: RwLock::new(Arc::new(RouteTable::default())),
            cache: ResolutionCache::new(self.cache_capacity),
            metrics: ResolutionMetrics::new(),
            slugs,
            reserved,
        };
        site.rebuild_routes()?;

        info!(
            languages = site.registry.len(),
            default = site.default_language.slug(),
            "✓ Site configured"
        );
        Ok(site)
    }
}

/// A configured multilingual site.
pub struct Site {
    settings: SiteSettings,
    site_url: Arc<SiteUrl>,
    registry: Arc<LanguageRegistry>,
    default_language: Language,
    types: ContentTypes,
    overrides: TypeRouteOverrides,
    store: Arc<dyn ContentStore>,
    provider: Box<dyn RouteProvider>,
    routes: RwLock<Arc<RouteTable>>,
    cache: ResolutionCache,
    metrics: ResolutionMetrics,
    slugs: SlugUniquenessResolver,
    reserved: ReservedSlugs,
}

impl Site {
    pub fn builder(settings: SiteSettings) -> SiteBuilder {
        SiteBuilder::new(settings)
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn site_url(&self) -> &SiteUrl {
        &self.site_url
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// Language by slug, falling back to the default language.
    pub fn language_or_default(&self, slug: Option<&str>) -> &Language {
        self.registry
            .resolve_or_default(slug)
            .unwrap_or(&self.default_language)
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.types
    }

    pub fn type_overrides(&self) -> &TypeRouteOverrides {
        &self.overrides
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    pub fn reserved_slugs(&self) -> &ReservedSlugs {
        &self.reserved
    }

    /// Snapshot of the current route table. A concurrent rebuild does not
    /// affect a snapshot already taken.
    pub fn routes(&self) -> Arc<RouteTable> {
        let guard = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Fresh request-scoped detector.
    pub fn detector(&self) -> LanguageDetector {
        LanguageDetector::new(Arc::clone(&self.registry), Arc::clone(&self.site_url))
    }

    /// Frontend request description carrying this site's admin path.
    pub fn request(&self, url: &str) -> RequestInfo {
        RequestInfo::frontend(url).with_admin_path(&self.settings.admin_path)
    }

    pub fn resolver(&self) -> UrlResolver<'_> {
        UrlResolver::new(self)
    }

    pub fn permalinks(&self) -> PermalinkBuilder<'_> {
        PermalinkBuilder::new(self)
    }

    pub fn converter(&self) -> UrlConverter<'_> {
        UrlConverter::new(self)
    }

    /// Validate, transform and compile the route table, then swap it in.
    ///
    /// # Returns
    /// * The validation report (warnings only) on success
    /// * The first validation or compile error otherwise; the previous table
    ///   stays active
    pub fn rebuild_routes(&self) -> Result<ValidationReport, ConfigurationError> {
        let base = self.provider.base_rules();

        let report = RouteTableValidator::validate(&base, &self.registry, &self.types, &self.overrides);
        if let Some(e) = report.errors.first() {
            error!("Route configuration error: {}", e);
            return Err(e.clone());
        }
        for warning in &report.warnings {
            warn!("{}", warning);
        }

        let rules = RouteTableTransformer::new(&self.registry, &self.types, &self.overrides)
            .transform(&base)?;
        let table = RouteTable::compile(rules).inspect_err(|e| {
            error!("Route configuration error: {}", e);
        })?;

        let count = table.len();
        {
            let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
            *routes = Arc::new(table);
        }
        self.cache.clear();

        info!("✓ Rebuilt route table: {} rules ({} base)", count, base.len());
        Ok(report)
    }

    /// Re-derive and store the per-language slugs of one entity.
    ///
    /// The default-language candidate is the explicit default override, the
    /// storage slug or the sanitized title, in that order. Other languages
    /// are regenerated where an override exists, and pinned to a unique slug
    /// where the storage slug showing through would collide. Root types share
    /// one URL space, so their siblings are checked across all root types.
    ///
    /// # Returns
    /// * Language slug -> assigned slug
    /// * `Err(EntityNotFound)` for an unknown id
    /// * `Err(EmptySlugCandidate)` if a candidate sanitizes to nothing
    pub fn resave_entity(&self, id: EntityId) -> Result<BTreeMap<String, String>, RoutingError> {
        let entity = self
            .store
            .get_entity(id)
            .ok_or(RoutingError::EntityNotFound(id))?;

        let shared_types: Vec<&str> = match self.types.get(&entity.content_type) {
            Some(def) if def.is_root_type() => self.types.root_types().map(|def| def.name.as_str()).collect(),
            _ => vec![entity.content_type.as_str()],
        };

        let default = &self.default_language;
        let raw = entity
            .slug_override(default.slug())
            .or(Some(entity.slug.as_str()).filter(|slug| !slug.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| entity.title.clone());
        let storage_slug = self.unique_slug(&entity, default, &sanitize_slug(&raw), &shared_types)?;

        let mut assigned = BTreeMap::new();
        assigned.insert(default.slug().to_string(), storage_slug.clone());

        for language in self.registry.non_default() {
            let slug = match entity.slug_override(language.slug()) {
                Some(raw) => self.unique_slug(&entity, language, &sanitize_slug(raw), &shared_types)?,
                None => {
                    let scope = slug_scope(&entity, language);
                    if !self.slug_taken(&scope, &shared_types, &storage_slug) {
                        continue;
                    }
                    self.unique_slug(&entity, language, &storage_slug, &shared_types)?
                }
            };
            assigned.insert(language.slug().to_string(), slug);
        }

        self.store.assign_slugs(id, &storage_slug, assigned.clone())?;

        info!(entity = %id, slugs = ?assigned, "Resaved entity slugs");
        Ok(assigned)
    }

    fn unique_slug(
        &self,
        entity: &Entity,
        language: &Language,
        candidate: &str,
        shared_types: &[&str],
    ) -> Result<String, RoutingError> {
        let scope = slug_scope(entity, language);
        self.slugs.make_unique(candidate, &scope, &self.reserved, |slug| {
            self.slug_taken(&scope, shared_types, slug)
        })
    }

    fn slug_taken(&self, scope: &SlugScope<'_>, shared_types: &[&str], slug: &str) -> bool {
        shared_types.iter().any(|&content_type| {
            self.store
                .sibling_slug_exists(&SlugScope { content_type, ..*scope }, slug)
        })
    }

    /// Run `resave_entity` over every entity. Failures are collected, not
    /// fatal.
    pub fn resave_all(&self) -> ResaveReport {
        let mut report = ResaveReport::default();
        for id in self.store.entity_ids() {
            match self.resave_entity(id) {
                Ok(_) => report.saved += 1,
                Err(e) => {
                    warn!(entity = %id, "Failed to resave entity: {}", e);
                    report.failed.push((id, e.to_string()));
                }
            }
        }
        info!(
            "✓ Slug pass finished: {} saved, {} failed",
            report.saved,
            report.failed.len()
        );
        report
    }
}

fn slug_scope<'e>(entity: &'e Entity, language: &'e Language) -> SlugScope<'e> {
    SlugScope {
        content_type: &entity.content_type,
        parent_id: entity.parent_id,
        language,
        exclude: Some(entity.id),
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("site_url", &self.settings.site_url)
            .field("languages", &self.registry.len())
            .field("routes", &self.routes().len())
            .finish_non_exhaustive()
    }
}

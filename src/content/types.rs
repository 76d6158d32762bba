//! Content type definitions and their per-language route slugs.

use crate::error::ConfigurationError;
use crate::i18n::{Language, LanguageRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    PostType,
    Taxonomy,
}

/// A routable content type as registered with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeDef {
    pub name: String,

    #[serde(default)]
    pub kind: TypeKind,

    #[serde(default)]
    pub hierarchical: bool,

    /// Fixed path segment in front of item URLs (e.g., "books"); `None` for
    /// types that live at the site root
    #[serde(default)]
    pub rewrite_slug: Option<String>,

    /// Path of the type's archive page, if it has one
    #[serde(default)]
    pub archive_slug: Option<String>,

    /// Query variable the route table fills with the item slug path
    pub query_var: String,
}

impl ContentTypeDef {
    pub fn post() -> Self {
        Self {
            name: "post".to_string(),
            kind: TypeKind::PostType,
            hierarchical: false,
            rewrite_slug: None,
            archive_slug: None,
            query_var: "name".to_string(),
        }
    }

    pub fn page() -> Self {
        Self {
            name: "page".to_string(),
            kind: TypeKind::PostType,
            hierarchical: true,
            rewrite_slug: None,
            archive_slug: None,
            query_var: "pagename".to_string(),
        }
    }

    pub fn category() -> Self {
        Self {
            name: "category".to_string(),
            kind: TypeKind::Taxonomy,
            hierarchical: true,
            rewrite_slug: Some("category".to_string()),
            archive_slug: None,
            query_var: "category_name".to_string(),
        }
    }

    pub fn post_tag() -> Self {
        Self {
            name: "post_tag".to_string(),
            kind: TypeKind::Taxonomy,
            hierarchical: false,
            rewrite_slug: Some("tag".to_string()),
            archive_slug: None,
            query_var: "tag".to_string(),
        }
    }

    /// Custom post type with a rewrite slug and an archive at the same path.
    pub fn custom(name: &str, slug: &str, hierarchical: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::PostType,
            hierarchical,
            rewrite_slug: Some(slug.to_string()),
            archive_slug: Some(slug.to_string()),
            query_var: name.to_string(),
        }
    }

    /// Taxonomy with its own rewrite slug.
    pub fn taxonomy(name: &str, slug: &str, hierarchical: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::Taxonomy,
            hierarchical,
            rewrite_slug: Some(slug.to_string()),
            archive_slug: None,
            query_var: name.to_string(),
        }
    }

    /// Types without a rewrite slug share the site root.
    pub fn is_root_type(&self) -> bool {
        self.kind == TypeKind::PostType
            && self.rewrite_slug.as_deref().map_or(true, str::is_empty)
    }

    /// Default-language slugs this type owns in the route table.
    pub fn owned_slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = Vec::new();
        for slug in [self.rewrite_slug.as_deref(), self.archive_slug.as_deref()]
            .into_iter()
            .flatten()
        {
            if !slug.is_empty() && !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }
        slugs
    }
}

/// Registered content types, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTypes {
    defs: Vec<ContentTypeDef>,
}

impl ContentTypes {
    pub fn new(defs: Vec<ContentTypeDef>) -> Self {
        Self { defs }
    }

    /// `post`, `page`, `category` and `post_tag`.
    pub fn builtin() -> Self {
        Self::new(vec![
            ContentTypeDef::post(),
            ContentTypeDef::page(),
            ContentTypeDef::category(),
            ContentTypeDef::post_tag(),
        ])
    }

    pub fn with(mut self, def: ContentTypeDef) -> Self {
        self.defs.retain(|existing| existing.name != def.name);
        self.defs.push(def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ContentTypeDef> {
        self.defs.iter().find(|def| def.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&ContentTypeDef, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownContentType(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentTypeDef> {
        self.defs.iter()
    }

    /// Types that live at the site root, in registration order.
    pub fn root_types(&self) -> impl Iterator<Item = &ContentTypeDef> {
        self.defs.iter().filter(|def| def.is_root_type())
    }

    /// Candidate types for a matched query variable.
    ///
    /// Root types share the catch-all route, so a match on one root type's
    /// variable tries every root type: the owner first, then the others in
    /// registration order.
    pub fn candidates_for_var(&self, query_var: &str) -> Vec<&ContentTypeDef> {
        let mut candidates: Vec<&ContentTypeDef> = self
            .defs
            .iter()
            .filter(|def| def.query_var == query_var)
            .collect();

        if candidates.iter().any(|def| def.is_root_type()) {
            for def in self.root_types() {
                if !candidates.iter().any(|c| c.name == def.name) {
                    candidates.push(def);
                }
            }
        }
        candidates
    }

    /// Check that no two types own the same default route slug.
    pub fn check_overlaps(&self) -> Result<(), ConfigurationError> {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for def in &self.defs {
            for slug in def.owned_slugs() {
                if let Some(first) = owners.insert(slug, def.name.as_str()) {
                    if first != def.name {
                        return Err(ConfigurationError::OverlappingTypeSlug {
                            slug: slug.to_string(),
                            first: first.to_string(),
                            second: def.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Translated fixed segments of one content type in one language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSlugOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_slug: Option<String>,
}

/// Per content type: language slug -> translated route segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRouteOverrides {
    by_type: BTreeMap<String, BTreeMap<String, RouteSlugOverride>>,
}

impl TypeRouteOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, content_type: &str, language: &str, value: RouteSlugOverride) {
        self.by_type
            .entry(content_type.to_string())
            .or_default()
            .insert(language.to_string(), value);
    }

    /// Set both the rewrite and the archive slug of a type for a language.
    pub fn with(mut self, content_type: &str, language: &str, slug: &str) -> Self {
        self.set(
            content_type,
            language,
            RouteSlugOverride {
                rewrite_slug: Some(slug.to_string()),
                archive_slug: Some(slug.to_string()),
            },
        );
        self
    }

    pub fn get(&self, content_type: &str, language: &str) -> Option<&RouteSlugOverride> {
        self.by_type.get(content_type)?.get(language)
    }

    pub fn has_overrides(&self, content_type: &str) -> bool {
        self.by_type
            .get(content_type)
            .is_some_and(|langs| !langs.is_empty())
    }

    /// Rewrite slug of `def` in `language`, falling back to the default slug.
    pub fn rewrite_slug_for<'a>(&'a self, def: &'a ContentTypeDef, language: &Language) -> Option<&'a str> {
        let translated = (!language.is_default())
            .then(|| self.get(&def.name, language.slug()))
            .flatten()
            .and_then(|o| o.rewrite_slug.as_deref())
            .filter(|slug| !slug.is_empty());
        translated.or(def.rewrite_slug.as_deref()).filter(|slug| !slug.is_empty())
    }

    /// Archive slug of `def` in `language`, falling back to the default slug.
    pub fn archive_slug_for<'a>(&'a self, def: &'a ContentTypeDef, language: &Language) -> Option<&'a str> {
        let translated = (!language.is_default())
            .then(|| self.get(&def.name, language.slug()))
            .flatten()
            .and_then(|o| o.archive_slug.as_deref())
            .filter(|slug| !slug.is_empty());
        translated.or(def.archive_slug.as_deref()).filter(|slug| !slug.is_empty())
    }

    /// Every accepted spelling of a default slug owned by `def`: the default
    /// itself first, then the translations in registry order.
    pub fn variants_of(
        &self,
        def: &ContentTypeDef,
        default_slug: &str,
        registry: &LanguageRegistry,
    ) -> Vec<String> {
        let mut variants = vec![default_slug.to_string()];
        for language in registry.non_default() {
            let Some(value) = self.get(&def.name, language.slug()) else {
                continue;
            };
            let mut push = |slug: Option<&String>| {
                if let Some(slug) = slug.filter(|s| !s.is_empty()) {
                    if !variants.contains(slug) {
                        variants.push(slug.clone());
                    }
                }
            };
            if def.rewrite_slug.as_deref() == Some(default_slug) {
                push(value.rewrite_slug.as_ref());
            }
            if def.archive_slug.as_deref() == Some(default_slug) {
                push(value.archive_slug.as_ref());
            }
        }
        variants
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &RouteSlugOverride)> {
        self.by_type.iter().flat_map(|(content_type, langs)| {
            langs
                .iter()
                .map(move |(lang, value)| (content_type.as_str(), lang.as_str(), value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LanguageRegistry {
        let mut registry = LanguageRegistry::new();
        registry.register("de", "de_DE", "Deutsch").unwrap();
        registry.register("en", "en_US", "English").unwrap();
        registry.register("fr", "fr_FR", "Français").unwrap();
        registry
    }

    // ==================== ContentTypes Tests ====================

    #[test]
    fn test_builtin_root_types() {
        let types = ContentTypes::builtin();
        let roots: Vec<_> = types.root_types().map(|def| def.name.as_str()).collect();
        assert_eq!(roots, vec!["post", "page"]);
    }

    #[test]
    fn test_candidates_for_root_var_include_all_root_types() {
        let types = ContentTypes::builtin();
        let names: Vec<_> = types
            .candidates_for_var("pagename")
            .into_iter()
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(names, vec!["page", "post"]);
    }

    #[test]
    fn test_candidates_for_prefixed_var() {
        let types = ContentTypes::builtin().with(ContentTypeDef::custom("book", "buecher", false));
        let names: Vec<_> = types
            .candidates_for_var("book")
            .into_iter()
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(names, vec!["book"]);
        assert!(types.candidates_for_var("unknown").is_empty());
    }

    #[test]
    fn test_check_overlaps_allows_same_type_rewrite_and_archive() {
        let types = ContentTypes::builtin().with(ContentTypeDef::custom("book", "buecher", false));
        assert!(types.check_overlaps().is_ok());
    }

    #[test]
    fn test_check_overlaps_rejects_shared_slug() {
        let types = ContentTypes::builtin()
            .with(ContentTypeDef::custom("book", "media", false))
            .with(ContentTypeDef::custom("film", "media", false));
        assert_eq!(
            types.check_overlaps().unwrap_err(),
            ConfigurationError::OverlappingTypeSlug {
                slug: "media".to_string(),
                first: "book".to_string(),
                second: "film".to_string(),
            }
        );
    }

    #[test]
    fn test_require_unknown_type() {
        let types = ContentTypes::builtin();
        assert!(matches!(
            types.require("movie"),
            Err(ConfigurationError::UnknownContentType(_))
        ));
    }

    // ==================== TypeRouteOverrides Tests ====================

    #[test]
    fn test_rewrite_slug_for_languages() {
        let registry = registry();
        let def = ContentTypeDef::custom("book", "buecher", false);
        let overrides = TypeRouteOverrides::new().with("book", "en", "books");

        let de = registry.get("de").unwrap();
        let en = registry.get("en").unwrap();
        let fr = registry.get("fr").unwrap();
        assert_eq!(overrides.rewrite_slug_for(&def, de), Some("buecher"));
        assert_eq!(overrides.rewrite_slug_for(&def, en), Some("books"));
        assert_eq!(overrides.rewrite_slug_for(&def, fr), Some("buecher"));
        assert_eq!(overrides.archive_slug_for(&def, en), Some("books"));
    }

    #[test]
    fn test_rewrite_slug_for_root_type_is_none() {
        let registry = registry();
        let overrides = TypeRouteOverrides::new();
        let def = ContentTypeDef::post();
        assert_eq!(overrides.rewrite_slug_for(&def, registry.get("en").unwrap()), None);
    }

    #[test]
    fn test_variants_of_dedupes_and_keeps_order() {
        let registry = registry();
        let def = ContentTypeDef::custom("book", "buecher", false);
        let overrides = TypeRouteOverrides::new()
            .with("book", "fr", "livres")
            .with("book", "en", "books");

        assert_eq!(
            overrides.variants_of(&def, "buecher", &registry),
            vec!["buecher", "books", "livres"]
        );
    }

    #[test]
    fn test_variants_of_separate_archive_slug() {
        let registry = registry();
        let mut def = ContentTypeDef::custom("book", "buch", false);
        def.archive_slug = Some("buecher".to_string());
        let mut overrides = TypeRouteOverrides::new();
        overrides.set(
            "book",
            "en",
            RouteSlugOverride {
                rewrite_slug: Some("book".to_string()),
                archive_slug: Some("books".to_string()),
            },
        );

        assert_eq!(overrides.variants_of(&def, "buch", &registry), vec!["buch", "book"]);
        assert_eq!(
            overrides.variants_of(&def, "buecher", &registry),
            vec!["buecher", "books"]
        );
    }

    #[test]
    fn test_overrides_json_shape() {
        let json = r#"{"book": {"en": {"rewrite_slug": "books", "archive_slug": "books"}}}"#;
        let overrides: TypeRouteOverrides = serde_json::from_str(json).expect("deserialize");
        assert!(overrides.has_overrides("book"));
        assert_eq!(
            overrides.get("book", "en").and_then(|o| o.rewrite_slug.as_deref()),
            Some("books")
        );
    }
}

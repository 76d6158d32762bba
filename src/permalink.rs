//! Entity to URL generation.

use crate::content::{Entity, TypeKind};
use crate::i18n::Language;
use crate::site::Site;
use serde::Serialize;

/// Options for `PermalinkBuilder::build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermalinkOptions {
    /// Link hidden entities to the fallback URL instead
    pub check_visibility: bool,
    /// Build the pretty link even for unpublished entities
    pub treat_as_published: bool,
}

impl Default for PermalinkOptions {
    fn default() -> Self {
        Self {
            check_visibility: true,
            treat_as_published: false,
        }
    }
}

/// Cross-language link annotation (`<link rel="alternate" hreflang=...>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub language: String,
    pub hreflang: String,
    pub url: String,
}

pub struct PermalinkBuilder<'a> {
    site: &'a Site,
}

impl<'a> PermalinkBuilder<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Canonical URL of `entity` in `language`.
    ///
    /// # Returns
    /// * The language's home URL for the front page
    /// * A `?p=` link for unpublished entities unless `treat_as_published`
    /// * The native permalink for the default language
    /// * The fallback URL for entities hidden in `language` (when
    ///   `check_visibility`) or without any slug
    /// * The translated permalink otherwise
    pub fn build(&self, entity: &Entity, language: &Language, options: PermalinkOptions) -> String {
        if self.site.settings().front_page == Some(entity.id) {
            return self.home_url(language);
        }
        if !options.treat_as_published && !entity.status.is_published() {
            if let Some(link) = self.draft_link(entity, language) {
                return link;
            }
        }
        if language.is_default() {
            return self.native(entity);
        }
        if options.check_visibility && !entity.is_visible_in(language) {
            return self.fallback_url(language);
        }
        self.slug_link(entity, language)
            .unwrap_or_else(|| self.fallback_url(language))
    }

    /// Permalink in the default language, from storage slugs only. Entities
    /// without any slug link to the default home page.
    pub fn native(&self, entity: &Entity) -> String {
        let language = self.site.default_language();
        self.slug_link(entity, language)
            .unwrap_or_else(|| self.home_url(language))
    }

    /// Pretty link built from the slug path alone, whatever the entity's
    /// status, visibility or front-page role.
    pub fn slug_link(&self, entity: &Entity, language: &Language) -> Option<String> {
        let slugs = self.site.store().slug_path(entity, language);
        if slugs.is_empty() {
            return None;
        }

        let mut segments: Vec<String> = Vec::with_capacity(slugs.len() + 1);
        if let Some(def) = self.site.content_types().get(&entity.content_type) {
            if let Some(prefix) = self.site.type_overrides().rewrite_slug_for(def, language) {
                segments.push(prefix.to_string());
            }
        }
        segments.extend(slugs);

        Some(
            self.site
                .site_url()
                .build(prefix_for(language), &segments, self.site.settings().trailing_slash),
        )
    }

    /// Check if `build` with default options sends a published `entity` to
    /// the fallback URL of `language`.
    pub fn falls_back(&self, entity: &Entity, language: &Language) -> bool {
        if language.is_default() || self.site.settings().front_page == Some(entity.id) {
            return false;
        }
        !entity.is_visible_in(language) || self.site.store().slug_path(entity, language).is_empty()
    }

    /// `?p=` style link for entities the route table cannot address yet.
    fn draft_link(&self, entity: &Entity, language: &Language) -> Option<String> {
        let def = self.site.content_types().get(&entity.content_type);
        if def.is_some_and(|def| def.kind != TypeKind::PostType) {
            return None;
        }
        let param = if def.is_some_and(|def| def.hierarchical) {
            "page_id"
        } else {
            "p"
        };
        Some(format!("{}?{}={}", self.home_url(language), param, entity.id))
    }

    /// Archive URL of a post type in `language`.
    pub fn archive(&self, content_type: &str, language: &Language) -> Option<String> {
        let def = self.site.content_types().get(content_type)?;
        let slug = self.site.type_overrides().archive_slug_for(def, language)?;
        Some(
            self.site
                .site_url()
                .build(prefix_for(language), &[slug], self.site.settings().trailing_slash),
        )
    }

    pub fn home_url(&self, language: &Language) -> String {
        self.site.site_url().home_url(language)
    }

    /// Where links to hidden content point.
    pub fn fallback_url(&self, language: &Language) -> String {
        self.site
            .settings()
            .visibility_fallback
            .clone()
            .unwrap_or_else(|| self.home_url(language))
    }

    /// Alternate links for every language `entity` is visible in, in
    /// registry order.
    pub fn alternates(&self, entity: &Entity) -> Vec<AlternateLink> {
        self.site
            .registry()
            .all()
            .iter()
            .filter(|language| entity.is_visible_in(language))
            .map(|language| AlternateLink {
                language: language.slug().to_string(),
                hreflang: language.html_lang(),
                url: self.build(entity, language, PermalinkOptions::default()),
            })
            .collect()
    }
}

fn prefix_for(language: &Language) -> Option<&str> {
    (!language.is_default()).then(|| language.slug())
}

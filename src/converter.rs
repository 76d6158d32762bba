use crate::i18n::{Language, LanguageDetector};
use crate::permalink::PermalinkOptions;
use crate::resolver::Resolution;
use crate::site::Site;
use crate::url::{join_segments, split_url, UrlParts};
use tracing::debug;

/// Translates URLs between languages.
///
/// Recognized content URLs are rebuilt from the entity they address, so the
/// result is the entity's canonical permalink in the target language. Any
/// other site URL gets its language prefix swapped.
pub struct UrlConverter<'a> {
    site: &'a Site,
}

impl<'a> UrlConverter<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Convert `url` (default: the detected request URL) to `target`
    /// (default: the current language). Unknown target languages fall back
    /// to the default language.
    pub fn convert(&self, url: Option<&str>, target: Option<&str>, detector: &mut LanguageDetector) -> String {
        let target = match target {
            Some(slug) => self.site.language_or_default(Some(slug)).clone(),
            None => detector
                .current()
                .unwrap_or_else(|| self.site.default_language().clone()),
        };
        let url = match url {
            Some(url) => url.to_string(),
            None => detector
                .request_url()
                .map(str::to_string)
                .unwrap_or_else(|| self.site.site_url().home_url(self.site.default_language())),
        };
        self.convert_to(&url, &target, detector)
    }

    pub fn convert_to(&self, url: &str, target: &Language, detector: &mut LanguageDetector) -> String {
        let Some(segments) = self.site.site_url().relative_segments(url) else {
            return url.to_string();
        };
        if self.is_untranslatable(&segments) {
            return url.to_string();
        }

        let source = segments
            .first()
            .and_then(|segment| self.site.registry().get(segment))
            .unwrap_or(self.site.default_language())
            .clone();
        if source.slug() == target.slug() {
            return url.to_string();
        }

        let parts = split_url(url);
        if let Some(converted) = self.convert_structural(url, &segments, &parts, &source, target, detector) {
            self.site.metrics().record_structural_conversion();
            debug!(url, converted = converted.as_str(), "Converted URL structurally");
            return converted;
        }

        self.site.metrics().record_literal_conversion();
        let converted = self.convert_literal(&segments, &parts, &source, target);
        debug!(url, converted = converted.as_str(), "Converted URL by prefix substitution");
        converted
    }

    fn is_untranslatable(&self, segments: &[String]) -> bool {
        let settings = self.site.settings();
        let Some(first) = segments.first() else {
            return false;
        };
        settings.asset_path_prefixes.iter().any(|prefix| prefix == first)
            || settings.admin_path.trim_matches('/') == first
    }

    fn convert_structural(
        &self,
        url: &str,
        segments: &[String],
        parts: &UrlParts<'_>,
        source: &Language,
        target: &Language,
        detector: &mut LanguageDetector,
    ) -> Option<String> {
        let resolved = self.site.resolver().resolve_target(url, detector)?;
        let permalinks = self.site.permalinks();

        let (source_link, target_link) = match resolved.resolution {
            Resolution::Entity(entity) => {
                if permalinks.falls_back(&entity, target) {
                    return Some(permalinks.fallback_url(target));
                }
                let as_found = PermalinkOptions {
                    check_visibility: false,
                    ..PermalinkOptions::default()
                };
                (
                    permalinks
                        .slug_link(&entity, source)
                        .unwrap_or_else(|| permalinks.build(&entity, source, as_found)),
                    permalinks.build(&entity, target, PermalinkOptions::default()),
                )
            }
            Resolution::Archive { content_type } => (
                permalinks.archive(&content_type, source)?,
                permalinks.archive(&content_type, target)?,
            ),
            Resolution::NotFound => return None,
        };

        let base = self
            .site
            .site_url()
            .relative_segments(&source_link)
            .unwrap_or_default();
        let extra: &[String] = if segments.starts_with(&base) {
            &segments[base.len()..]
        } else {
            &[]
        };
        Some(append_suffix(target_link, extra, parts))
    }

    fn convert_literal(
        &self,
        segments: &[String],
        parts: &UrlParts<'_>,
        source: &Language,
        target: &Language,
    ) -> String {
        let rest = match segments.first() {
            Some(first) if !source.is_default() && first == source.slug() => &segments[1..],
            _ => segments,
        };
        let prefix = (!target.is_default()).then(|| target.slug());
        let trailing = parts.path.ends_with('/');
        let link = self.site.site_url().build(prefix, rest, trailing);
        append_suffix(link, &[], parts)
    }
}

fn append_suffix(mut link: String, extra: &[String], parts: &UrlParts<'_>) -> String {
    if !extra.is_empty() {
        if !link.ends_with('/') {
            link.push('/');
        }
        link.push_str(&join_segments(extra));
        if parts.path.ends_with('/') {
            link.push('/');
        }
    }
    if let Some(query) = parts.query {
        link.push('?');
        link.push_str(query);
    }
    if let Some(fragment) = parts.fragment {
        link.push('#');
        link.push_str(fragment);
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentTypeDef, ContentTypes, Entity, EntityId, InMemoryContentStore, TypeRouteOverrides};
    use crate::site::SiteSettings;
    use std::sync::Arc;

    fn site() -> Site {
        let store = InMemoryContentStore::from_entities(vec![
            Entity::new(123, "post", "hallo").with_slug("en", "hello"),
            Entity::new(2, "page", "impressum"),
            Entity::new(5, "post", "geheim").hidden_in("en"),
            Entity::new(6, "book", "faust").with_slug("en", "faust-en"),
        ])
        .unwrap();

        Site::builder(SiteSettings::new("https://site"))
            .language("de", "de_DE", "Deutsch")
            .language("en", "en_US", "English")
            .language("fr", "fr_FR", "Français")
            .content_types(ContentTypes::builtin().with(ContentTypeDef::custom("book", "buecher", false)))
            .type_overrides(TypeRouteOverrides::new().with("book", "en", "books"))
            .store(Arc::new(store))
            .build()
            .unwrap()
    }

    fn convert(site: &Site, url: &str, lang: &str) -> String {
        let mut detector = site.detector();
        site.converter().convert(Some(url), Some(lang), &mut detector)
    }

    // ==================== Structural Conversion Tests ====================

    #[test]
    fn test_convert_post_both_ways() {
        let site = site();
        assert_eq!(convert(&site, "https://site/hallo/", "en"), "https://site/en/hello/");
        assert_eq!(convert(&site, "https://site/en/hello/", "de"), "https://site/hallo/");
        assert_eq!(convert(&site, "https://site/en/hello/", "fr"), "https://site/fr/hallo/");
    }

    #[test]
    fn test_convert_keeps_suffix_query_and_fragment() {
        let site = site();
        assert_eq!(convert(&site, "https://site/en/hello/feed/", "de"), "https://site/hallo/feed/");
        assert_eq!(convert(&site, "https://site/hallo/2/", "en"), "https://site/en/hello/2/");
        assert_eq!(
            convert(&site, "https://site/hallo/?utm=x#top", "en"),
            "https://site/en/hello/?utm=x#top"
        );
    }

    #[test]
    fn test_convert_hidden_entity_goes_to_fallback() {
        let site = site();
        assert_eq!(convert(&site, "https://site/geheim/?a=1", "en"), "https://site/en/");
    }

    #[test]
    fn test_convert_front_page_keeps_query_and_fragment() {
        let store = InMemoryContentStore::from_entities(vec![
            Entity::new(8, "page", "startseite").with_slug("en", "home"),
            Entity::new(9, "page", "kontakt"),
        ])
        .unwrap();
        let mut settings = SiteSettings::new("https://site");
        settings.front_page = Some(EntityId(8));
        let site = Site::builder(settings)
            .language("de", "de_DE", "Deutsch")
            .language("en", "en_US", "English")
            .store(Arc::new(store))
            .build()
            .unwrap();

        assert_eq!(convert(&site, "https://site/startseite/?s=x#top", "en"), "https://site/en/?s=x#top");
        assert_eq!(convert(&site, "https://site/en/home/#top", "de"), "https://site/#top");
        assert_eq!(convert(&site, "https://site/kontakt/?s=x", "en"), "https://site/en/kontakt/?s=x");
    }

    #[test]
    fn test_convert_prefixed_type_and_archive() {
        let site = site();
        assert_eq!(convert(&site, "https://site/buecher/faust/", "en"), "https://site/en/books/faust-en/");
        assert_eq!(convert(&site, "https://site/en/books/", "de"), "https://site/buecher/");
        assert_eq!(convert(&site, "https://site/buecher/page/2/", "en"), "https://site/en/books/page/2/");
    }

    // ==================== Short-circuit Tests ====================

    #[test]
    fn test_external_and_asset_urls_unchanged() {
        let site = site();
        assert_eq!(convert(&site, "https://cdn.example/hallo/", "en"), "https://cdn.example/hallo/");
        assert_eq!(
            convert(&site, "https://site/wp-content/uploads/a.png", "en"),
            "https://site/wp-content/uploads/a.png"
        );
        assert_eq!(convert(&site, "mailto:someone@site", "en"), "mailto:someone@site");
    }

    #[test]
    fn test_same_language_unchanged() {
        let site = site();
        assert_eq!(convert(&site, "https://site/en/whatever", "en"), "https://site/en/whatever");
        assert_eq!(convert(&site, "https://site/hallo", "de"), "https://site/hallo");
    }

    // ==================== Literal Conversion Tests ====================

    #[test]
    fn test_unknown_paths_swap_prefix() {
        let site = site();
        assert_eq!(convert(&site, "https://site/en/some/deep/path/", "de"), "https://site/some/deep/path/");
        assert_eq!(convert(&site, "https://site/page/2/", "en"), "https://site/en/page/2/");
        assert_eq!(convert(&site, "https://site/en/", "fr"), "https://site/fr/");
        assert_eq!(convert(&site, "https://site/", "en"), "https://site/en/");
        assert_eq!(convert(&site, "/en/zzz?x=1", "de"), "https://site/zzz?x=1");
    }

    #[test]
    fn test_conversion_metrics() {
        let site = site();
        convert(&site, "https://site/hallo/", "en");
        convert(&site, "https://site/nichts/", "en");
        let report = site.metrics().report();
        assert_eq!(report.structural_conversions, 1);
        assert_eq!(report.literal_conversions, 1);
    }

    // ==================== Defaults Tests ====================

    #[test]
    fn test_defaults_come_from_detector() {
        let site = site();
        let mut detector = site.detector();
        detector.detect(&site.request("https://site/hallo/"));

        let converter = site.converter();
        assert_eq!(converter.convert(None, None, &mut detector), "https://site/hallo/");
        assert_eq!(converter.convert(None, Some("en"), &mut detector), "https://site/en/hello/");
    }

    #[test]
    fn test_unknown_target_falls_back_to_default() {
        let site = site();
        assert_eq!(convert(&site, "https://site/en/hello/", "it"), "https://site/hallo/");
    }
}

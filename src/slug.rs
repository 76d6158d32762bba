//! Per-language slug generation.
//!
//! `make_unique` turns a sanitized candidate into a slug that collides with
//! no sibling (same content type, parent and language), shadows no language
//! prefix or system endpoint at the root, and cannot be mistaken for a
//! pagination segment.

use crate::content::EntityId;
use crate::error::RoutingError;
use crate::i18n::{Language, LanguageRegistry};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Where a slug has to be unique.
#[derive(Debug, Clone, Copy)]
pub struct SlugScope<'a> {
    pub content_type: &'a str,
    pub parent_id: Option<EntityId>,
    pub language: &'a Language,
    /// The entity being saved, which never collides with itself
    pub exclude: Option<EntityId>,
}

/// Host hook that can reject a candidate slug.
pub trait SlugPolicy: Send + Sync {
    fn is_bad_slug(&self, slug: &str, scope: &SlugScope<'_>) -> bool;
}

/// Policy that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SlugPolicy for AcceptAll {
    fn is_bad_slug(&self, _slug: &str, _scope: &SlugScope<'_>) -> bool {
        false
    }
}

impl<F> SlugPolicy for F
where
    F: Fn(&str, &SlugScope<'_>) -> bool + Send + Sync,
{
    fn is_bad_slug(&self, slug: &str, scope: &SlugScope<'_>) -> bool {
        self(slug, scope)
    }
}

/// Words a root-level slug must not take.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedSlugs {
    words: BTreeSet<String>,
}

impl ReservedSlugs {
    /// Every language slug, the feed names and `embed`.
    pub fn new<S: AsRef<str>>(registry: &LanguageRegistry, feed_names: &[S]) -> Self {
        let mut words: BTreeSet<String> = registry.slugs().map(str::to_string).collect();
        words.extend(feed_names.iter().map(|name| name.as_ref().to_string()));
        words.insert("embed".to_string());
        Self { words }
    }

    pub fn with_extra<S: AsRef<str>>(mut self, extra: &[S]) -> Self {
        self.words
            .extend(extra.iter().map(|word| word.as_ref().to_string()));
        self
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.words.contains(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Collision-free slug generation.
#[derive(Clone)]
pub struct SlugUniquenessResolver {
    pagination_base: String,
    policy: Arc<dyn SlugPolicy>,
}

impl std::fmt::Debug for SlugUniquenessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugUniquenessResolver")
            .field("pagination_base", &self.pagination_base)
            .finish_non_exhaustive()
    }
}

impl SlugUniquenessResolver {
    pub fn new(pagination_base: &str) -> Self {
        Self {
            pagination_base: pagination_base.to_string(),
            policy: Arc::new(AcceptAll),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn SlugPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// `12` or `page12` would be read as a page number.
    pub fn is_pagination_like(&self, slug: &str) -> bool {
        let digits = slug.strip_prefix(self.pagination_base.as_str()).unwrap_or(slug);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    /// Make `candidate` unique within `scope`.
    ///
    /// # Arguments
    /// * `candidate` - Sanitized, non-empty base slug
    /// * `scope` - Type, parent and language the slug must be unique in
    /// * `reserved` - Words a root-level slug must avoid
    /// * `taken` - Sibling lookup: `true` if a sibling already uses the slug
    ///
    /// # Returns
    /// * `candidate` itself, or `{candidate}-{n}` with `n >= 2`
    /// * `Err(EmptySlugCandidate)` for an empty candidate
    pub fn make_unique<F>(
        &self,
        candidate: &str,
        scope: &SlugScope<'_>,
        reserved: &ReservedSlugs,
        taken: F,
    ) -> Result<String, RoutingError>
    where
        F: Fn(&str) -> bool,
    {
        if candidate.is_empty() {
            return Err(RoutingError::EmptySlugCandidate);
        }

        let at_root = scope.parent_id.is_none();
        let mut count: u64 = if (at_root && reserved.contains(candidate))
            || self.is_pagination_like(candidate)
            || self.policy.is_bad_slug(candidate, scope)
        {
            2
        } else {
            0
        };

        loop {
            let attempt = if count == 0 {
                candidate.to_string()
            } else {
                format!("{}-{}", candidate, count)
            };

            let blocked = taken(&attempt) || (at_root && reserved.contains(&attempt));
            if !blocked {
                return Ok(attempt);
            }

            count = if count == 0 { 2 } else { count + 1 };
        }
    }
}

/// Turn free text into a URL slug.
///
/// German umlauts become two letters, other common Latin diacritics lose their
/// mark, and every run of other characters becomes a single `-`.
pub fn sanitize_slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        let mapped = transliterate(c);
        let mut chars = mapped.chars().peekable();
        if chars.peek().is_none() {
            pending_dash = true;
            continue;
        }
        for m in chars {
            if m.is_ascii_alphanumeric() || (!m.is_ascii() && m.is_alphanumeric()) {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(m);
            } else {
                pending_dash = true;
            }
        }
    }

    out
}

fn transliterate(c: char) -> String {
    let mapped = match c {
        'ä' | 'æ' => "ae",
        'ö' | 'œ' => "oe",
        'ü' => "ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ą' => "a",
        'ç' | 'ć' | 'č' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' => "o",
        'ù' | 'ú' | 'û' | 'ū' | 'ů' => "u",
        'ý' | 'ÿ' => "y",
        'ś' | 'š' => "s",
        'ź' | 'ż' | 'ž' => "z",
        'ł' => "l",
        'đ' | 'ď' => "d",
        'ř' => "r",
        'ť' => "t",
        '\'' | '’' => "",
        _ => return c.to_string(),
    };
    mapped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry() -> LanguageRegistry {
        let mut registry = LanguageRegistry::new();
        registry.register("de", "de_DE", "Deutsch").unwrap();
        registry.register("en", "en_US", "English").unwrap();
        registry
    }

    fn reserved(registry: &LanguageRegistry) -> ReservedSlugs {
        ReservedSlugs::new(registry, &["feed", "rss2"])
    }

    fn scope<'a>(language: &'a Language, parent: Option<u64>) -> SlugScope<'a> {
        SlugScope {
            content_type: "post",
            parent_id: parent.map(EntityId),
            language,
            exclude: None,
        }
    }

    // ==================== make_unique Tests ====================

    #[test]
    fn test_unique_candidate_is_kept() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let slug = resolver
            .make_unique("news", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |_| false)
            .unwrap();
        assert_eq!(slug, "news");
    }

    #[test]
    fn test_first_collision_jumps_to_two() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let taken: HashSet<&str> = ["news"].into_iter().collect();
        let slug = resolver
            .make_unique("news", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |s| {
                taken.contains(s)
            })
            .unwrap();
        assert_eq!(slug, "news-2");
    }

    #[test]
    fn test_repeated_collisions_increment() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let taken: HashSet<&str> = ["news", "news-2", "news-3"].into_iter().collect();
        let slug = resolver
            .make_unique("news", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |s| {
                taken.contains(s)
            })
            .unwrap();
        assert_eq!(slug, "news-4");
    }

    #[test]
    fn test_language_slug_at_root_is_suffixed() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let slug = resolver
            .make_unique("en", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |_| false)
            .unwrap();
        assert_eq!(slug, "en-2");
    }

    #[test]
    fn test_reserved_word_below_root_is_allowed() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let slug = resolver
            .make_unique("feed", &scope(registry.get("de").unwrap(), Some(1)), &reserved(&registry), |_| false)
            .unwrap();
        assert_eq!(slug, "feed");
    }

    #[test]
    fn test_embed_is_always_reserved() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let slug = resolver
            .make_unique("embed", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |_| false)
            .unwrap();
        assert_eq!(slug, "embed-2");
    }

    #[test]
    fn test_pagination_like_slugs_are_suffixed() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let lang = registry.get("de").unwrap();
        let reserved = reserved(&registry);

        assert_eq!(resolver.make_unique("2024", &scope(lang, Some(3)), &reserved, |_| false).unwrap(), "2024-2");
        assert_eq!(resolver.make_unique("page3", &scope(lang, Some(3)), &reserved, |_| false).unwrap(), "page3-2");
        assert_eq!(resolver.make_unique("page", &scope(lang, Some(3)), &reserved, |_| false).unwrap(), "page");
    }

    #[test]
    fn test_reserved_start_then_collision_increments() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let slug = resolver
            .make_unique("en", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |s| s == "en-2")
            .unwrap();
        assert_eq!(slug, "en-3");
    }

    #[test]
    fn test_bad_slug_policy() {
        let registry = registry();
        let policy = |slug: &str, _scope: &SlugScope<'_>| slug == "admin";
        let resolver = SlugUniquenessResolver::new("page").with_policy(Arc::new(policy));
        let slug = resolver
            .make_unique("admin", &scope(registry.get("de").unwrap(), Some(1)), &reserved(&registry), |_| false)
            .unwrap();
        assert_eq!(slug, "admin-2");
    }

    #[test]
    fn test_empty_candidate_fails() {
        let registry = registry();
        let resolver = SlugUniquenessResolver::new("page");
        let result =
            resolver.make_unique("", &scope(registry.get("de").unwrap(), None), &reserved(&registry), |_| false);
        assert!(matches!(result, Err(RoutingError::EmptySlugCandidate)));
    }

    // ==================== ReservedSlugs Tests ====================

    #[test]
    fn test_reserved_contains_languages_feeds_and_embed() {
        let registry = registry();
        let reserved = reserved(&registry).with_extra(&["wp-admin"]);
        for word in ["de", "en", "feed", "rss2", "embed", "wp-admin"] {
            assert!(reserved.contains(word), "{} should be reserved", word);
        }
        assert!(!reserved.contains("news"));
    }

    // ==================== sanitize_slug Tests ====================

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_slug("Hello World"), "hello-world");
        assert_eq!(sanitize_slug("  Hello,   World!  "), "hello-world");
        assert_eq!(sanitize_slug("C'est la vie"), "cest-la-vie");
    }

    #[test]
    fn test_sanitize_transliterates() {
        assert_eq!(sanitize_slug("Über uns"), "ueber-uns");
        assert_eq!(sanitize_slug("Straße"), "strasse");
        assert_eq!(sanitize_slug("Crème brûlée"), "creme-brulee");
    }

    #[test]
    fn test_sanitize_keeps_non_latin_letters() {
        assert_eq!(sanitize_slug("Привет мир"), "привет-мир");
    }

    #[test]
    fn test_sanitize_only_punctuation_is_empty() {
        assert_eq!(sanitize_slug("!!! ???"), "");
    }
}

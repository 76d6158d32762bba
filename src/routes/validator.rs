//! Route configuration validation.
//!
//! Runs before every rebuild. Errors abort the rebuild; warnings point at
//! configurations that compile but route some URLs unexpectedly.

use crate::content::{ContentTypes, TypeRouteOverrides};
use crate::error::ConfigurationError;
use crate::i18n::LanguageRegistry;
use crate::routes::{RoutePattern, RouteRule};
use std::collections::{BTreeMap, BTreeSet};

/// Validation report containing errors and warnings about a route setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the table unusable
    pub errors: Vec<ConfigurationError>,

    /// Problems that shadow or duplicate routes
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct RouteTableValidator;

impl RouteTableValidator {
    /// Validate a base table together with the language and type setup.
    ///
    /// This function checks that:
    /// - no two content types own the same default slug (error)
    /// - no base rule starts with a language slug
    /// - no translated type slug equals a language slug
    /// - no pattern appears twice
    /// - no two types translate to the same slug in one language
    pub fn validate(
        base: &[RouteRule],
        registry: &LanguageRegistry,
        types: &ContentTypes,
        overrides: &TypeRouteOverrides,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        if registry.is_empty() {
            report.errors.push(ConfigurationError::NoLanguagesRegistered);
        }
        if let Err(e) = types.check_overlaps() {
            report.errors.push(e);
        }

        let mut seen = BTreeSet::new();
        for rule in base {
            let pattern = RoutePattern::parse(&rule.pattern);
            if let Some(head) = pattern.literal_head().filter(|_| pattern.head_is_segment()) {
                if registry.is_valid(head) {
                    report.warnings.push(format!(
                        "Rule #{} starts with the language slug '{}' and is shadowed by the language prefix",
                        rule.order, head
                    ));
                }
            }
            if !seen.insert(rule.pattern.as_str()) {
                report
                    .warnings
                    .push(format!("Pattern '{}' appears more than once", rule.pattern));
            }
        }

        // (language, slug) -> type
        let mut translated: BTreeMap<(&str, &str), &str> = BTreeMap::new();
        for (content_type, language, value) in overrides.iter() {
            if types.get(content_type).is_none() {
                report.warnings.push(format!(
                    "Overrides given for unregistered content type '{}'",
                    content_type
                ));
            }
            if !registry.is_valid(language) {
                report.warnings.push(format!(
                    "Overrides of '{}' given for unregistered language '{}'",
                    content_type, language
                ));
            }

            let slugs: BTreeSet<&str> = [value.rewrite_slug.as_deref(), value.archive_slug.as_deref()]
                .into_iter()
                .flatten()
                .filter(|slug| !slug.is_empty())
                .collect();
            for slug in slugs {
                if registry.is_valid(slug) {
                    report.warnings.push(format!(
                        "Type '{}' translates to the language slug '{}' in '{}'",
                        content_type, slug, language
                    ));
                }
                if let Some(other) = translated.insert((language, slug), content_type) {
                    if other != content_type {
                        report.warnings.push(format!(
                            "Types '{}' and '{}' both translate to '{}' in '{}'",
                            other, content_type, slug, language
                        ));
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentTypeDef;

    fn registry() -> LanguageRegistry {
        let mut registry = LanguageRegistry::new();
        registry.register("de", "de_DE", "Deutsch").unwrap();
        registry.register("en", "en_US", "English").unwrap();
        registry
    }

    fn base() -> Vec<RouteRule> {
        vec![
            RouteRule::new("tag/([^/]+)/?$", "tag=$matches[1]", 1),
            RouteRule::new("([^/]+)/?$", "name=$matches[1]", 2),
        ]
    }

    #[test]
    fn test_clean_setup() {
        let types = ContentTypes::builtin().with(ContentTypeDef::custom("book", "buecher", false));
        let overrides = TypeRouteOverrides::new().with("book", "en", "books");
        let report = RouteTableValidator::validate(&base(), &registry(), &types, &overrides);
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_overlap_is_error() {
        let types = ContentTypes::builtin()
            .with(ContentTypeDef::custom("book", "media", false))
            .with(ContentTypeDef::custom("film", "media", false));
        let report = RouteTableValidator::validate(&base(), &registry(), &types, &TypeRouteOverrides::new());
        assert!(report.has_errors());
    }

    #[test]
    fn test_rule_headed_by_language_slug_warns() {
        let mut rules = base();
        rules.push(RouteRule::new("en/special/?$", "pagename=special", 3));
        let report =
            RouteTableValidator::validate(&rules, &registry(), &ContentTypes::builtin(), &TypeRouteOverrides::new());
        assert!(!report.has_errors());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("language slug 'en'"));
    }

    #[test]
    fn test_duplicate_pattern_warns() {
        let mut rules = base();
        rules.push(RouteRule::new("tag/([^/]+)/?$", "tag=$matches[1]", 3));
        let report =
            RouteTableValidator::validate(&rules, &registry(), &ContentTypes::builtin(), &TypeRouteOverrides::new());
        assert!(report.has_warnings());
    }

    #[test]
    fn test_translated_slug_collisions_warn() {
        let types = ContentTypes::builtin()
            .with(ContentTypeDef::custom("book", "buecher", false))
            .with(ContentTypeDef::custom("film", "filme", false));
        let overrides = TypeRouteOverrides::new()
            .with("book", "en", "media")
            .with("film", "en", "media")
            .with("post_tag", "en", "de");
        let report = RouteTableValidator::validate(&base(), &registry(), &types, &overrides);

        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("both translate to 'media'")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("language slug 'de'")));
    }
}

//! Language registry: the ordered set of site languages.
//!
//! The registry is filled during setup and shared read-only afterwards
//! (the `Site` keeps it behind an `Arc`). Insertion order is preserved and
//! is the canonical enumeration order. The first registered language is the
//! default language.

use crate::error::{ConfigurationError, RoutingError};
use crate::i18n::{Language, TextDirection};
use tracing::warn;

/// Ordered collection of registered languages.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: Vec::new(),
        }
    }

    /// Register a language, inferring its text direction from the locale.
    ///
    /// # Arguments
    /// * `slug` - URL prefix for the language (e.g., "en")
    /// * `locale_tag` - Locale (e.g., "en_US")
    /// * `display_name` - Human readable name
    ///
    /// # Returns
    /// * `Ok(&Language)` with the registered language
    /// * `Err(DuplicateLanguage)` if the slug is already registered
    /// * `Err(InvalidLanguageSlug)` if the slug cannot be used as a path segment
    pub fn register(
        &mut self,
        slug: &str,
        locale_tag: &str,
        display_name: &str,
    ) -> Result<&Language, ConfigurationError> {
        self.register_with_direction(
            slug,
            locale_tag,
            display_name,
            TextDirection::from_locale(locale_tag),
        )
    }

    /// Register a language with an explicit text direction.
    pub fn register_with_direction(
        &mut self,
        slug: &str,
        locale_tag: &str,
        display_name: &str,
        text_direction: TextDirection,
    ) -> Result<&Language, ConfigurationError> {
        if !is_valid_language_slug(slug) {
            return Err(ConfigurationError::InvalidLanguageSlug(slug.to_string()));
        }
        if self.is_valid(slug) {
            return Err(ConfigurationError::DuplicateLanguage(slug.to_string()));
        }

        // First one in wins the default flag.
        let is_default = self.languages.is_empty();
        self.languages.push(Language::new(
            slug,
            locale_tag,
            display_name,
            text_direction,
            is_default,
        ));

        Ok(&self.languages[self.languages.len() - 1])
    }

    /// Get all languages in registration order.
    pub fn all(&self) -> &[Language] {
        &self.languages
    }

    /// Get every language except the default one, in registration order.
    pub fn non_default(&self) -> impl Iterator<Item = &Language> {
        self.languages.iter().filter(|lang| !lang.is_default())
    }

    /// Get the default language.
    ///
    /// # Returns
    /// * `Err(NoLanguagesRegistered)` if the registry is empty
    pub fn default(&self) -> Result<&Language, ConfigurationError> {
        self.languages
            .first()
            .ok_or(ConfigurationError::NoLanguagesRegistered)
    }

    /// Get a language by slug.
    pub fn get(&self, slug: &str) -> Option<&Language> {
        self.languages.iter().find(|lang| lang.slug() == slug)
    }

    /// Get a language by slug, failing with `UnknownLanguage`.
    pub fn lookup(&self, slug: &str) -> Result<&Language, RoutingError> {
        self.get(slug)
            .ok_or_else(|| RoutingError::UnknownLanguage(slug.to_string()))
    }

    /// Check if a slug belongs to a registered language.
    pub fn is_valid(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// Resolve an optional language slug, falling back to the default
    /// language when it is missing or not registered.
    pub fn resolve_or_default(&self, slug: Option<&str>) -> Result<&Language, ConfigurationError> {
        match slug {
            Some(slug) => match self.get(slug) {
                Some(lang) => Ok(lang),
                None => {
                    warn!(language = slug, "Unknown language, using default language");
                    self.default()
                }
            },
            None => self.default(),
        }
    }

    /// Iterate over the slugs of all languages.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|lang| lang.slug())
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

fn is_valid_language_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

//! Language type: one registered site language and its metadata.
//!
//! Languages are only created by `LanguageRegistry::register`, which is the
//! sole place that decides which language is the default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Primary subtags of locales written right-to-left.
    const RTL_SUBTAGS: [&'static str; 10] =
        ["ar", "he", "fa", "ur", "ps", "sd", "ug", "yi", "dv", "ckb"];

    /// Infer the direction from a locale tag such as `ar_EG` or `he-IL`.
    pub fn from_locale(locale_tag: &str) -> Self {
        let primary = locale_tag
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if Self::RTL_SUBTAGS.contains(&primary.as_str()) {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }
}

/// A registered site language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Language {
    /// URL prefix and storage key (e.g., "en", "de")
    slug: String,

    /// Locale tag as configured (e.g., "en_US", "de_DE")
    locale_tag: String,

    /// Human readable name (e.g., "English", "Deutsch")
    display_name: String,

    text_direction: TextDirection,

    /// Exactly one registered language is the default
    is_default: bool,
}

impl Language {
    pub(crate) fn new(
        slug: &str,
        locale_tag: &str,
        display_name: &str,
        text_direction: TextDirection,
        is_default: bool,
    ) -> Self {
        Self {
            slug: slug.to_string(),
            locale_tag: locale_tag.to_string(),
            display_name: display_name.to_string(),
            text_direction,
            is_default,
        }
    }

    /// Get the language slug used in URLs and per-language slug maps.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn locale_tag(&self) -> &str {
        &self.locale_tag
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn text_direction(&self) -> TextDirection {
        self.text_direction
    }

    /// Check if this is the default language (the first one registered).
    ///
    /// Default-language URLs carry no language prefix.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_rtl(&self) -> bool {
        self.text_direction == TextDirection::Rtl
    }

    /// Get the locale as a BCP-47 tag for `hreflang` annotations.
    ///
    /// # Example
    /// ```ignore
    /// assert_eq!(german.html_lang(), "de-DE");
    /// ```
    pub fn html_lang(&self) -> String {
        self.locale_tag.replace('_', "-")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== TextDirection Tests ====================

    #[test]
    fn test_direction_from_rtl_locales() {
        assert_eq!(TextDirection::from_locale("ar"), TextDirection::Rtl);
        assert_eq!(TextDirection::from_locale("he_IL"), TextDirection::Rtl);
        assert_eq!(TextDirection::from_locale("fa-IR"), TextDirection::Rtl);
        assert_eq!(TextDirection::from_locale("ckb"), TextDirection::Rtl);
    }

    #[test]
    fn test_direction_from_ltr_locales() {
        assert_eq!(TextDirection::from_locale("en_US"), TextDirection::Ltr);
        assert_eq!(TextDirection::from_locale("de"), TextDirection::Ltr);
        assert_eq!(TextDirection::from_locale(""), TextDirection::Ltr);
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        assert_eq!(TextDirection::from_locale("AR_eg"), TextDirection::Rtl);
    }

    // ==================== Language Tests ====================

    #[test]
    fn test_language_accessors() {
        let lang = Language::new("de", "de_DE", "Deutsch", TextDirection::Ltr, true);
        assert_eq!(lang.slug(), "de");
        assert_eq!(lang.locale_tag(), "de_DE");
        assert_eq!(lang.display_name(), "Deutsch");
        assert!(lang.is_default());
        assert!(!lang.is_rtl());
    }

    #[test]
    fn test_html_lang() {
        let lang = Language::new("pt-br", "pt_BR", "Português", TextDirection::Ltr, false);
        assert_eq!(lang.html_lang(), "pt-BR");
    }

    #[test]
    fn test_display_is_slug() {
        let lang = Language::new("ar", "ar", "العربية", TextDirection::Rtl, false);
        assert_eq!(lang.to_string(), "ar");
        assert!(lang.is_rtl());
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&TextDirection::Rtl).expect("serialize");
        assert_eq!(json, "\"rtl\"");
    }
}

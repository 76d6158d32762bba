//! Typed view of a route pattern.
//!
//! A pattern is split into an optional language prefix group, a literal head
//! segment and the untouched remainder. Translating a table rewrites the
//! first two as data; the remainder is never edited.

use std::fmt;

/// First path segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternHead {
    /// Pattern starts with a group, class or other regex syntax
    None,
    /// Plain leading text such as `category` in `category/(.+?)/?$`
    Literal(String),
    /// Any of several spellings of the same segment
    Alternation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    /// Language slugs accepted as an optional leading segment
    pub language_prefix: Option<Vec<String>>,
    pub head: PatternHead,
    pub rest: String,
}

impl RoutePattern {
    /// Split a monolingual pattern. A leading `^` is dropped.
    ///
    /// The literal head stops at the first character outside
    /// `[A-Za-z0-9_-]`. When that character is a quantifier, the last literal
    /// character belongs to it and is left in `rest`.
    pub fn parse(pattern: &str) -> Self {
        let body = pattern.strip_prefix('^').unwrap_or(pattern);
        let mut end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(body.len());

        if end > 0 && matches!(body[end..].chars().next(), Some('?' | '*' | '+' | '{')) {
            end -= 1;
        }

        let head = match &body[..end] {
            "" => PatternHead::None,
            literal => PatternHead::Literal(literal.to_string()),
        };

        Self {
            language_prefix: None,
            head,
            rest: body[end..].to_string(),
        }
    }

    /// Pattern matching only the site root, with or without a language slug.
    pub fn root(language_slugs: Vec<String>) -> Self {
        Self {
            language_prefix: Some(language_slugs),
            head: PatternHead::None,
            rest: "$".to_string(),
        }
    }

    /// Literal head text, if the head is still a plain literal.
    pub fn literal_head(&self) -> Option<&str> {
        match &self.head {
            PatternHead::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Check if the head literal is a whole path segment, not the start of a
    /// longer word.
    pub fn head_is_segment(&self) -> bool {
        self.rest.is_empty() || self.rest.starts_with(['/', '$', '\\', '(', '.'])
    }

    pub fn with_language_prefix(mut self, slugs: Vec<String>) -> Self {
        self.language_prefix = Some(slugs);
        self
    }

    pub fn with_head(mut self, head: PatternHead) -> Self {
        self.head = head;
        self
    }

    fn is_root(&self) -> bool {
        self.head == PatternHead::None && self.rest == "$"
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("^")?;

        if let Some(slugs) = self.language_prefix.as_ref().filter(|slugs| !slugs.is_empty()) {
            let escaped: Vec<String> = slugs.iter().map(|slug| regex::escape(slug)).collect();
            if self.is_root() {
                write!(f, "(?:{})?/?", escaped.join("|"))?;
            } else {
                // A language slug is only a prefix when a non-word character
                // follows it, so "en-2" or "english" are never split.
                let alternatives: Vec<String> =
                    escaped.iter().map(|slug| format!(r"{}[^\w-]", slug)).collect();
                write!(f, "(?:{})?/?", alternatives.join("|"))?;
            }
        }

        match &self.head {
            PatternHead::None => {}
            PatternHead::Literal(literal) => f.write_str(literal)?,
            PatternHead::Alternation(variants) => {
                let escaped: Vec<String> = variants.iter().map(|v| regex::escape(v)).collect();
                write!(f, "(?:{})", escaped.join("|"))?;
            }
        }

        f.write_str(&self.rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn langs() -> Vec<String> {
        vec!["de".to_string(), "en".to_string()]
    }

    // ==================== Parse Tests ====================

    #[test]
    fn test_parse_literal_head() {
        let pattern = RoutePattern::parse("category/(.+?)/?$");
        assert_eq!(pattern.literal_head(), Some("category"));
        assert_eq!(pattern.rest, "/(.+?)/?$");
        assert!(pattern.head_is_segment());
    }

    #[test]
    fn test_parse_group_head() {
        let pattern = RoutePattern::parse("^([^/]+)(?:/([0-9]+))?/?$");
        assert_eq!(pattern.head, PatternHead::None);
        assert_eq!(pattern.rest, "([^/]+)(?:/([0-9]+))?/?$");
    }

    #[test]
    fn test_parse_backs_off_before_quantifier() {
        let pattern = RoutePattern::parse("tags?/([^/]+)/?$");
        assert_eq!(pattern.literal_head(), Some("tag"));
        assert_eq!(pattern.rest, "s?/([^/]+)/?$");
        assert!(!pattern.head_is_segment());
    }

    #[test]
    fn test_longer_word_is_not_a_segment() {
        let pattern = RoutePattern::parse("categoryfoo/?$");
        assert_eq!(pattern.literal_head(), Some("categoryfoo"));
    }

    // ==================== Render Tests ====================

    #[test]
    fn test_render_without_changes_is_anchored_original() {
        let pattern = RoutePattern::parse("category/(.+?)/?$");
        assert_eq!(pattern.to_string(), "^category/(.+?)/?$");
    }

    #[test]
    fn test_render_root() {
        assert_eq!(RoutePattern::root(langs()).to_string(), "^(?:de|en)?/?$");
    }

    #[test]
    fn test_render_prefix_and_alternation() {
        let pattern = RoutePattern::parse("buecher/([^/]+)/?$")
            .with_language_prefix(langs())
            .with_head(PatternHead::Alternation(vec!["buecher".to_string(), "books".to_string()]));
        assert_eq!(
            pattern.to_string(),
            r"^(?:de[^\w-]|en[^\w-])?/?(?:buecher|books)/([^/]+)/?$"
        );
    }

    #[test]
    fn test_prefix_does_not_split_slug() {
        let pattern = RoutePattern::parse("([^/]+)/?$").with_language_prefix(langs());
        let regex = Regex::new(&pattern.to_string()).unwrap();

        let caps = regex.captures("en/hello").unwrap();
        assert_eq!(&caps[1], "hello");

        let caps = regex.captures("en-2").unwrap();
        assert_eq!(&caps[1], "en-2");

        let caps = regex.captures("english").unwrap();
        assert_eq!(&caps[1], "english");
    }

    #[test]
    fn test_alternation_escapes_variants() {
        let pattern = RoutePattern::parse("a/?$")
            .with_head(PatternHead::Alternation(vec!["a".to_string(), "b.c".to_string()]));
        assert_eq!(pattern.to_string(), r"^(?:a|b\.c)/?$");
    }
}

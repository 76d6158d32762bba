//! URL splitting and path normalization.
//!
//! Paths are compared in a canonical form: every segment is percent-decoded
//! and re-encoded (uppercase hex, RFC 3986 unreserved characters left as is),
//! and empty segments are dropped. Slugs in the content store are kept
//! decoded; encoding happens when a URL is rendered.

use crate::error::ConfigurationError;
use crate::i18n::Language;
use regex::Regex;
use std::sync::OnceLock;

// RFC 3986, appendix B
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Borrowed components of a URL reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlParts<'a> {
    pub scheme: Option<&'a str>,
    pub host: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// Split an absolute or relative URL into its components.
pub fn split_url(url: &str) -> UrlParts<'_> {
    let regex = URL_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^(?:([A-Za-z][A-Za-z0-9+.\-]*):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
            .expect("valid URL regex")
    });

    match regex.captures(url) {
        Some(caps) => UrlParts {
            scheme: caps.get(1).map(|m| m.as_str()),
            host: caps.get(2).map(|m| m.as_str()),
            path: caps.get(3).map(|m| m.as_str()).unwrap_or_default(),
            query: caps.get(4).map(|m| m.as_str()),
            fragment: caps.get(5).map(|m| m.as_str()),
        },
        None => UrlParts {
            path: url,
            ..UrlParts::default()
        },
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept literally and invalid
/// UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]));
            if let (Some(high), Some(low)) = hex {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Percent-encode a single path segment.
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Decoded, non-empty segments of a path.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(percent_decode)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Canonical form of a path: re-encoded segments joined by `/`, without
/// leading or trailing slashes.
pub fn normalize_path(path: &str) -> String {
    join_segments(&path_segments(path))
}

/// Encode and join decoded segments.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| encode_segment(segment.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}

/// The site's own address: scheme, host and an optional base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl {
    scheme: String,
    host: String,
    base_segments: Vec<String>,
}

impl SiteUrl {
    /// Parse the site url (e.g., `https://example.com` or
    /// `https://example.com/blog`).
    pub fn parse(site_url: &str) -> Result<Self, ConfigurationError> {
        let parts = split_url(site_url.trim());
        let (Some(scheme), Some(host)) = (parts.scheme, parts.host) else {
            return Err(ConfigurationError::InvalidSiteUrl(site_url.to_string()));
        };
        if host.is_empty() || parts.query.is_some() || parts.fragment.is_some() {
            return Err(ConfigurationError::InvalidSiteUrl(site_url.to_string()));
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
            base_segments: path_segments(parts.path),
        })
    }

    /// `scheme://host` without a trailing slash.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check if a URL belongs to this site. Relative references do.
    pub fn is_own(&self, url: &str) -> bool {
        let parts = split_url(url);
        match (parts.scheme, parts.host) {
            (_, Some(host)) => host.eq_ignore_ascii_case(&self.host),
            (Some(_), None) => false,
            (None, None) => true,
        }
    }

    /// Decoded path segments of `url` below the site's base path.
    ///
    /// # Returns
    /// * `None` if the URL points to another host or lies outside the base path
    pub fn relative_segments(&self, url: &str) -> Option<Vec<String>> {
        if !self.is_own(url) {
            return None;
        }
        let segments = path_segments(split_url(url).path);
        if segments.len() < self.base_segments.len()
            || segments[..self.base_segments.len()] != self.base_segments[..]
        {
            return None;
        }
        Some(segments[self.base_segments.len()..].to_vec())
    }

    /// Render an absolute URL from a language prefix and decoded segments.
    ///
    /// Home URLs (no prefix, no segments) always end with a slash.
    pub fn build<S: AsRef<str>>(
        &self,
        language_prefix: Option<&str>,
        segments: &[S],
        trailing_slash: bool,
    ) -> String {
        let mut all: Vec<&str> = self.base_segments.iter().map(String::as_str).collect();
        if let Some(prefix) = language_prefix {
            all.push(prefix);
        }
        let is_home = segments.is_empty();
        all.extend(segments.iter().map(|segment| segment.as_ref()));

        let mut url = format!("{}/", self.origin());
        url.push_str(&join_segments(&all));
        if !all.is_empty() && (is_home || trailing_slash) {
            url.push('/');
        }
        url
    }

    /// Home URL of a language: the site root for the default language,
    /// `{site}/{slug}/` otherwise.
    pub fn home_url(&self, language: &Language) -> String {
        let prefix = (!language.is_default()).then(|| language.slug());
        self.build::<&str>(prefix, &[], true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::TextDirection;

    fn site() -> SiteUrl {
        SiteUrl::parse("https://Site.example").unwrap()
    }

    // ==================== split_url Tests ====================

    #[test]
    fn test_split_absolute_url() {
        let parts = split_url("https://site.example/en/hello/?p=1#top");
        assert_eq!(parts.scheme, Some("https"));
        assert_eq!(parts.host, Some("site.example"));
        assert_eq!(parts.path, "/en/hello/");
        assert_eq!(parts.query, Some("p=1"));
        assert_eq!(parts.fragment, Some("top"));
    }

    #[test]
    fn test_split_relative_url() {
        let parts = split_url("/en/hello?x=y");
        assert_eq!(parts.scheme, None);
        assert_eq!(parts.host, None);
        assert_eq!(parts.path, "/en/hello");
        assert_eq!(parts.query, Some("x=y"));
    }

    #[test]
    fn test_split_protocol_relative_url() {
        let parts = split_url("//cdn.example/img.png");
        assert_eq!(parts.host, Some("cdn.example"));
        assert_eq!(parts.path, "/img.png");
    }

    // ==================== Percent Encoding Tests ====================

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("caf%c3%a9"), "café");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("a%2"), "a%2");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("café"), "caf%C3%A9");
        assert_eq!(encode_segment("a b"), "a%20b");
        assert_eq!(encode_segment("hello-world_1.2~"), "hello-world_1.2~");
    }

    #[test]
    fn test_normalize_path_is_canonical() {
        assert_eq!(normalize_path("/en//caf%c3%a9/"), "en/caf%C3%A9");
        assert_eq!(normalize_path("en/café"), "en/caf%C3%A9");
        assert_eq!(normalize_path("///"), "");
    }

    // ==================== SiteUrl Tests ====================

    #[test]
    fn test_site_url_parse_rejects_relative() {
        assert!(SiteUrl::parse("/just/a/path").is_err());
        assert!(SiteUrl::parse("https://").is_err());
    }

    #[test]
    fn test_is_own() {
        let site = site();
        assert!(site.is_own("https://site.example/en/"));
        assert!(site.is_own("HTTP://SITE.EXAMPLE/"));
        assert!(site.is_own("/relative/path"));
        assert!(!site.is_own("https://cdn.example/a.png"));
        assert!(!site.is_own("mailto:someone"));
    }

    #[test]
    fn test_relative_segments_with_base_path() {
        let site = SiteUrl::parse("https://site.example/blog").unwrap();
        assert_eq!(
            site.relative_segments("https://site.example/blog/en/hello/"),
            Some(vec!["en".to_string(), "hello".to_string()])
        );
        assert_eq!(site.relative_segments("https://site.example/other/"), None);
        assert_eq!(site.relative_segments("https://elsewhere.example/blog/"), None);
    }

    #[test]
    fn test_build_urls() {
        let site = site();
        assert_eq!(site.build::<&str>(None, &[], true), "https://site.example/");
        assert_eq!(site.build::<&str>(Some("en"), &[], false), "https://site.example/en/");
        assert_eq!(
            site.build(Some("en"), &["hello"], true),
            "https://site.example/en/hello/"
        );
        assert_eq!(
            site.build(None, &["about", "team"], false),
            "https://site.example/about/team"
        );
    }

    #[test]
    fn test_home_url() {
        let site = site();
        let de = Language::new("de", "de_DE", "Deutsch", TextDirection::Ltr, true);
        let en = Language::new("en", "en_US", "English", TextDirection::Ltr, false);
        assert_eq!(site.home_url(&de), "https://site.example/");
        assert_eq!(site.home_url(&en), "https://site.example/en/");
    }
}

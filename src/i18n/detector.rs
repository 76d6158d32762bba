//! Current-language detection for a request.
//!
//! The detector is request-scoped. Instead of a single overwritable slot it
//! keeps an explicit stack: every `switch_to` pushes the language it replaces
//! and `restore` pops exactly one level, so a resolution nested inside another
//! resolution gets back the language its caller was using.

use crate::error::RoutingError;
use crate::i18n::{Language, LanguageRegistry};
use crate::url::SiteUrl;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the detector needs to know about the incoming request.
pub trait RequestContext {
    fn is_admin_like(&self) -> bool;

    fn is_ajax_like(&self) -> bool;

    fn referrer_url(&self) -> Option<&str>;

    fn current_url(&self) -> &str;

    /// Language slug stored in the admin preference cookie.
    fn language_cookie(&self) -> Option<&str>;

    fn set_language_cookie(&mut self, slug: &str);

    /// User locale setting (e.g., "en_US").
    fn user_locale(&self) -> Option<&str>;

    /// Check if a URL originates from the admin area.
    fn is_admin_origin(&self, url: &str) -> bool;
}

/// Plain request description, used by the HTTP layer and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub current_url: String,
    pub referrer: Option<String>,
    pub admin: bool,
    pub ajax: bool,
    pub cookie_language: Option<String>,
    pub user_locale: Option<String>,
    /// Path prefix of the admin area (e.g., "/wp-admin")
    pub admin_path: String,
}

impl RequestInfo {
    pub fn frontend(url: &str) -> Self {
        Self {
            current_url: url.to_string(),
            admin_path: "/wp-admin".to_string(),
            ..Self::default()
        }
    }

    pub fn admin(url: &str) -> Self {
        Self {
            admin: true,
            ..Self::frontend(url)
        }
    }

    pub fn ajax(url: &str, referrer: Option<&str>) -> Self {
        Self {
            ajax: true,
            referrer: referrer.map(str::to_string),
            ..Self::frontend(url)
        }
    }

    pub fn with_cookie(mut self, slug: &str) -> Self {
        self.cookie_language = Some(slug.to_string());
        self
    }

    pub fn with_user_locale(mut self, locale: &str) -> Self {
        self.user_locale = Some(locale.to_string());
        self
    }

    pub fn with_admin_path(mut self, admin_path: &str) -> Self {
        self.admin_path = admin_path.to_string();
        self
    }
}

impl RequestContext for RequestInfo {
    fn is_admin_like(&self) -> bool {
        self.admin
    }

    fn is_ajax_like(&self) -> bool {
        self.ajax
    }

    fn referrer_url(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    fn current_url(&self) -> &str {
        &self.current_url
    }

    fn language_cookie(&self) -> Option<&str> {
        self.cookie_language.as_deref()
    }

    fn set_language_cookie(&mut self, slug: &str) {
        self.cookie_language = Some(slug.to_string());
    }

    fn user_locale(&self) -> Option<&str> {
        self.user_locale.as_deref()
    }

    fn is_admin_origin(&self, url: &str) -> bool {
        let admin_path = self.admin_path.trim_matches('/');
        if admin_path.is_empty() {
            return false;
        }
        let path = crate::url::split_url(url).path;
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .any(|segment| segment == admin_path)
    }
}

/// Find the language whose slug is the first path segment of `url`.
pub fn language_in_url<'r>(
    site_url: &SiteUrl,
    registry: &'r LanguageRegistry,
    url: &str,
) -> Option<&'r Language> {
    site_url
        .relative_segments(url)?
        .first()
        .and_then(|segment| registry.get(segment))
}

/// Request-scoped current-language state.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    registry: Arc<LanguageRegistry>,
    site_url: Arc<SiteUrl>,
    current: Option<Language>,
    snapshot: Option<Language>,
    stack: Vec<Option<Language>>,
    request_url: Option<String>,
}

impl LanguageDetector {
    pub fn new(registry: Arc<LanguageRegistry>, site_url: Arc<SiteUrl>) -> Self {
        Self {
            registry,
            site_url,
            current: None,
            snapshot: None,
            stack: Vec::new(),
            request_url: None,
        }
    }

    /// Detect the current language for a request and make it the snapshot
    /// that `reset` returns to.
    ///
    /// Order: ajax calls use the referrer unless it comes from the admin area,
    /// admin requests use the preference cookie then the user locale, and
    /// everything else uses the request URL. Unregistered results fall back
    /// to the default language.
    pub fn detect(&mut self, ctx: &dyn RequestContext) -> Option<Language> {
        let detected = self.detect_slug(ctx);
        let language = detected
            .as_deref()
            .and_then(|slug| self.registry.get(slug))
            .or_else(|| self.registry.default().ok())
            .cloned();

        if let (Some(slug), Some(lang)) = (detected.as_deref(), language.as_ref()) {
            if slug != lang.slug() {
                warn!(detected = slug, fallback = lang.slug(), "Detected language is not registered");
            }
        }

        debug!(language = ?language.as_ref().map(Language::slug), "Detected request language");

        self.request_url = Some(ctx.current_url().to_string());
        self.current = language.clone();
        self.snapshot = language.clone();
        self.stack.clear();
        language
    }

    fn detect_slug(&self, ctx: &dyn RequestContext) -> Option<String> {
        if ctx.is_ajax_like() {
            if let Some(referrer) = ctx.referrer_url() {
                if !ctx.is_admin_origin(referrer) {
                    return self.slug_in_url(referrer);
                }
            }
        }

        if ctx.is_admin_like() {
            if let Some(cookie) = ctx.language_cookie() {
                return Some(cookie.to_string());
            }
            return ctx
                .user_locale()
                .and_then(|locale| locale.split('_').next())
                .filter(|slug| !slug.is_empty())
                .map(str::to_ascii_lowercase);
        }

        self.slug_in_url(ctx.current_url())
    }

    fn slug_in_url(&self, url: &str) -> Option<String> {
        language_in_url(&self.site_url, &self.registry, url).map(|lang| lang.slug().to_string())
    }

    /// Get the current language, or the default language before detection.
    pub fn current(&self) -> Option<Language> {
        self.current
            .clone()
            .or_else(|| self.registry.default().ok().cloned())
    }

    /// URL of the request the detector was run against.
    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    /// Make `slug` the current language, remembering the previous one.
    ///
    /// # Returns
    /// * `Err(UnknownLanguage)` if the slug is not registered (state unchanged)
    pub fn switch_to(&mut self, slug: &str) -> Result<Language, RoutingError> {
        let language = self.registry.lookup(slug)?.clone();
        self.stack.push(self.current.take());
        self.current = Some(language.clone());
        Ok(language)
    }

    /// Undo the most recent `switch_to`. Without a pending switch this is a
    /// no-op.
    pub fn restore(&mut self) -> Option<Language> {
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
        }
        self.current()
    }

    /// Return to the language captured at detection and drop pending
    /// switches.
    pub fn reset(&mut self) -> Option<Language> {
        self.stack.clear();
        self.current = self.snapshot.clone();
        self.current()
    }

    /// Run `f` with `slug` as the current language, restoring the previous
    /// language afterwards.
    pub fn with_language<T>(
        &mut self,
        slug: &str,
        f: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, RoutingError> {
        self.switch_to(slug)?;
        let result = f(self);
        self.restore();
        Ok(result)
    }

    /// Number of switches waiting for a `restore`.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Store the current language in the admin preference cookie.
    pub fn remember_preference(&self, ctx: &mut dyn RequestContext) {
        if let Some(language) = self.current() {
            ctx.set_language_cookie(language.slug());
        }
    }
}

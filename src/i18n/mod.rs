//! Site languages and current-language detection.
//!
//! # Architecture
//!
//! - `registry`: Ordered set of registered languages; the first one is the default
//! - `language`: `Language` value type and its metadata (locale, direction)
//! - `detector`: Request-scoped current language with an explicit switch stack
//!
//! # Example
//!
//! ```rust,ignore
//! use lingua_routes::i18n::{LanguageRegistry, RequestInfo};
//!
//! let mut registry = LanguageRegistry::new();
//! registry.register("de", "de_DE", "Deutsch")?;
//! registry.register("en", "en_US", "English")?;
//! assert_eq!(registry.default()?.slug(), "de");
//!
//! let mut detector = site.detector();
//! detector.detect(&RequestInfo::frontend("https://site.example/en/hello/"));
//! ```

mod detector;
mod language;
mod registry;

pub use detector::{language_in_url, LanguageDetector, RequestContext, RequestInfo};
pub use language::{Language, TextDirection};
pub use registry::LanguageRegistry;

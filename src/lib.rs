//! Multilingual URL routing for a shared content tree.
//!
//! One content entity gets a slug per language, the host's monolingual route
//! table is rewritten to accept language prefixes and translated type slugs,
//! and URLs are translated between languages by resolving them to the entity
//! they address and rebuilding its permalink.

pub mod cache;
pub mod config;
pub mod content;
pub mod converter;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod permalink;
pub mod resolver;
pub mod routes;
pub mod security;
pub mod server;
pub mod site;
pub mod site_file;
pub mod slug;
pub mod url;

pub use error::{ConfigurationError, RoutingError};
pub use site::{Site, SiteBuilder, SiteSettings};

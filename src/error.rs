//! Error taxonomy for the routing core.
//!
//! Configuration errors are fatal at setup and are surfaced to the operator.
//! Everything else is scoped to a single call: an unknown language falls back
//! to the default language at the call site, an empty slug candidate fails one
//! save, and "not found" is never an error at all (resolution returns `None`).

use crate::content::EntityId;
use thiserror::Error;

/// Setup-time misconfiguration. Never silently recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no languages registered")]
    NoLanguagesRegistered,

    #[error("language '{0}' is already registered")]
    DuplicateLanguage(String),

    #[error("invalid language slug '{0}' (expected lowercase letters, digits or '-')")]
    InvalidLanguageSlug(String),

    #[error("content types '{first}' and '{second}' share the route slug '{slug}'")]
    OverlappingTypeSlug {
        slug: String,
        first: String,
        second: String,
    },

    #[error("route rule #{order} ('{pattern}') is malformed: {reason}")]
    MalformedRoute {
        order: usize,
        pattern: String,
        reason: String,
    },

    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    #[error("invalid site url '{0}'")]
    InvalidSiteUrl(String),
}

/// Errors raised by routing operations.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("unknown language '{0}'")]
    UnknownLanguage(String),

    #[error("slug candidate is empty")]
    EmptySlugCandidate,

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("entity {0} would become its own ancestor")]
    HierarchyCycle(EntityId),

    #[error("content store error: {0}")]
    Store(String),
}

pub type Result<T, E = RoutingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_messages() {
        let err = ConfigurationError::OverlappingTypeSlug {
            slug: "books".to_string(),
            first: "book".to_string(),
            second: "novel".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "content types 'book' and 'novel' share the route slug 'books'"
        );
        assert_eq!(
            ConfigurationError::DuplicateLanguage("en".to_string()).to_string(),
            "language 'en' is already registered"
        );
    }

    #[test]
    fn test_configuration_error_converts_into_routing_error() {
        let err: RoutingError = ConfigurationError::NoLanguagesRegistered.into();
        assert!(matches!(
            err,
            RoutingError::Configuration(ConfigurationError::NoLanguagesRegistered)
        ));
        assert_eq!(err.to_string(), "no languages registered");
    }

    #[test]
    fn test_entity_not_found_message() {
        let err = RoutingError::EntityNotFound(EntityId(42));
        assert_eq!(err.to_string(), "entity 42 not found");
    }
}

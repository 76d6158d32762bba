use crate::content::{ContentTypes, TypeRouteOverrides};
use crate::error::ConfigurationError;
use crate::i18n::LanguageRegistry;
use crate::routes::{PatternHead, RoutePattern, RouteRule};
use tracing::debug;

/// Turns a monolingual route table into a multilingual one.
///
/// Every rule gets an optional language prefix group, and rules headed by a
/// type's default rewrite or archive slug accept every translation of it.
/// A root rule for the language home pages is prepended.
#[derive(Debug, Clone, Copy)]
pub struct RouteTableTransformer<'a> {
    registry: &'a LanguageRegistry,
    types: &'a ContentTypes,
    overrides: &'a TypeRouteOverrides,
}

impl<'a> RouteTableTransformer<'a> {
    pub fn new(
        registry: &'a LanguageRegistry,
        types: &'a ContentTypes,
        overrides: &'a TypeRouteOverrides,
    ) -> Self {
        Self {
            registry,
            types,
            overrides,
        }
    }

    /// Transform `base` into the multilingual table.
    ///
    /// # Returns
    /// * The root rule at order 0 followed by every base rule, in the base
    ///   table's relative order, renumbered from 1
    /// * `Err(NoLanguagesRegistered)` for an empty registry
    /// * `Err(OverlappingTypeSlug)` if two types own the same default slug
    pub fn transform(&self, base: &[RouteRule]) -> Result<Vec<RouteRule>, ConfigurationError> {
        if self.registry.is_empty() {
            return Err(ConfigurationError::NoLanguagesRegistered);
        }
        self.types.check_overlaps()?;

        let slugs: Vec<String> = self.registry.slugs().map(str::to_string).collect();

        let mut ordered: Vec<&RouteRule> = base.iter().collect();
        ordered.sort_by_key(|rule| rule.order);

        let mut rules = Vec::with_capacity(ordered.len() + 1);
        rules.push(RouteRule {
            pattern: RoutePattern::root(slugs.clone()).to_string(),
            target: "index.php".to_string(),
            order: 0,
        });

        let mut translated = 0;
        for (index, rule) in ordered.into_iter().enumerate() {
            let mut pattern = RoutePattern::parse(&rule.pattern).with_language_prefix(slugs.clone());
            if let Some(variants) = self.head_variants(&pattern) {
                pattern = pattern.with_head(PatternHead::Alternation(variants));
                translated += 1;
            }
            rules.push(RouteRule {
                pattern: pattern.to_string(),
                target: rule.target.clone(),
                order: index + 1,
            });
        }

        debug!(
            rules = rules.len(),
            translated, "Transformed route table"
        );
        Ok(rules)
    }

    /// Translated spellings of the head segment, when a content type with
    /// overrides owns it.
    fn head_variants(&self, pattern: &RoutePattern) -> Option<Vec<String>> {
        let head = pattern.literal_head()?;
        if !pattern.head_is_segment() {
            return None;
        }

        let owner = self
            .types
            .iter()
            .find(|def| def.owned_slugs().contains(&head))?;
        if !self.overrides.has_overrides(&owner.name) {
            return None;
        }

        let variants = self.overrides.variants_of(owner, head, self.registry);
        (variants.len() > 1).then_some(variants)
    }
}

use crate::content::{Entity, EntityId};
use crate::error::RoutingError;
use crate::i18n::Language;
use crate::slug::SlugScope;
use std::collections::BTreeMap;

/// Interface to the persistent content storage.
///
/// Slug comparisons use effective slugs: the override for the language when
/// present, the storage slug otherwise (see `Entity::effective_slug`).
pub trait ContentStore: Send + Sync {
    fn get_entity(&self, id: EntityId) -> Option<Entity>;

    /// The child of `parent_id` (root when `None`) with the given type and
    /// effective slug in `language`.
    fn find_children(
        &self,
        parent_id: Option<EntityId>,
        content_type: &str,
        language: &Language,
        slug: &str,
    ) -> Option<Entity>;

    /// Every entity of `content_type` whose effective slug in `language` is
    /// `slug`, anywhere in the tree.
    fn find_by_leaf_slug(&self, content_type: &str, language: &Language, slug: &str) -> Vec<Entity>;

    /// Ancestor ids of `id`, root first, excluding `id` itself.
    fn get_ancestors(&self, id: EntityId) -> Vec<EntityId>;

    /// Counter bumped on every change to a slug, parent or status.
    fn current_content_version(&self) -> u64;

    /// Check if a sibling within `scope` already uses `slug`.
    fn sibling_slug_exists(&self, scope: &SlugScope<'_>, slug: &str) -> bool;

    /// Persist generated per-language slugs. The default-language slug is
    /// mirrored into the storage slug.
    fn assign_slugs(
        &self,
        id: EntityId,
        storage_slug: &str,
        slugs: BTreeMap<String, String>,
    ) -> Result<(), RoutingError>;

    fn entity_ids(&self) -> Vec<EntityId>;

    /// Effective slugs of the ancestors of `entity` and the entity itself in
    /// `language`, root first. Empty slugs are skipped.
    fn slug_path(&self, entity: &Entity, language: &Language) -> Vec<String> {
        let mut segments: Vec<String> = self
            .get_ancestors(entity.id)
            .into_iter()
            .filter_map(|id| self.get_entity(id))
            .map(|ancestor| ancestor.effective_slug(language).to_string())
            .collect();
        segments.push(entity.effective_slug(language).to_string());
        segments.retain(|segment| !segment.is_empty());
        segments
    }
}

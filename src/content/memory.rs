use crate::content::{ContentStore, Entity, EntityId};
use crate::error::RoutingError;
use crate::i18n::Language;
use crate::slug::SlugScope;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    entities: BTreeMap<EntityId, Entity>,
    version: u64,
}

/// `ContentStore` kept in process memory.
///
/// Every mutation bumps the content version, which invalidates resolution
/// cache entries without touching them.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    state: RwLock<StoreState>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of entities.
    ///
    /// Entities are inserted in order; parents need not come first, but the
    /// finished parent links must form a tree.
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self, RoutingError> {
        let store = Self::new();
        {
            let mut state = store.write();
            for entity in entities {
                state.entities.insert(entity.id, entity);
            }
            let ids: Vec<EntityId> = state.entities.keys().copied().collect();
            for id in ids {
                check_no_cycle(&state.entities, id)?;
            }
            state.version = 1;
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace an entity.
    ///
    /// # Returns
    /// * `Err(HierarchyCycle)` if the parent link would make the entity its own ancestor
    pub fn upsert(&self, entity: Entity) -> Result<(), RoutingError> {
        let mut state = self.write();
        let id = entity.id;
        let previous = state.entities.insert(id, entity);

        if let Err(e) = check_no_cycle(&state.entities, id) {
            match previous {
                Some(previous) => state.entities.insert(id, previous),
                None => state.entities.remove(&id),
            };
            return Err(e);
        }

        state.version += 1;
        debug!(entity = %id, version = state.version, "Stored entity");
        Ok(())
    }

    pub fn remove(&self, id: EntityId) -> Option<Entity> {
        let mut state = self.write();
        let removed = state.entities.remove(&id);
        if removed.is_some() {
            state.version += 1;
        }
        removed
    }

    /// Snapshot of all entities in id order.
    pub fn entities(&self) -> Vec<Entity> {
        self.read().entities.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entities.is_empty()
    }
}

fn check_no_cycle(entities: &BTreeMap<EntityId, Entity>, id: EntityId) -> Result<(), RoutingError> {
    let mut cursor = entities.get(&id).and_then(|e| e.parent_id);
    let mut steps = 0;
    while let Some(parent) = cursor {
        if parent == id || steps > entities.len() {
            return Err(RoutingError::HierarchyCycle(id));
        }
        steps += 1;
        cursor = entities.get(&parent).and_then(|e| e.parent_id);
    }
    Ok(())
}

impl ContentStore for InMemoryContentStore {
    fn get_entity(&self, id: EntityId) -> Option<Entity> {
        self.read().entities.get(&id).cloned()
    }

    fn find_children(
        &self,
        parent_id: Option<EntityId>,
        content_type: &str,
        language: &Language,
        slug: &str,
    ) -> Option<Entity> {
        self.read()
            .entities
            .values()
            .find(|e| {
                e.parent_id == parent_id
                    && e.content_type == content_type
                    && e.effective_slug(language) == slug
            })
            .cloned()
    }

    fn find_by_leaf_slug(&self, content_type: &str, language: &Language, slug: &str) -> Vec<Entity> {
        self.read()
            .entities
            .values()
            .filter(|e| e.content_type == content_type && e.effective_slug(language) == slug)
            .cloned()
            .collect()
    }

    fn get_ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let state = self.read();
        let mut ancestors = Vec::new();
        let mut cursor = state.entities.get(&id).and_then(|e| e.parent_id);
        while let Some(parent) = cursor {
            // Parent links are validated on insert; the bound only guards
            // against a store mutated behind our back.
            if ancestors.len() > state.entities.len() {
                break;
            }
            ancestors.push(parent);
            cursor = state.entities.get(&parent).and_then(|e| e.parent_id);
        }
        ancestors.reverse();
        ancestors
    }

    fn current_content_version(&self) -> u64 {
        self.read().version
    }

    fn sibling_slug_exists(&self, scope: &SlugScope<'_>, slug: &str) -> bool {
        self.read().entities.values().any(|e| {
            Some(e.id) != scope.exclude
                && e.parent_id == scope.parent_id
                && e.content_type == scope.content_type
                && e.effective_slug(scope.language) == slug
        })
    }

    fn assign_slugs(
        &self,
        id: EntityId,
        storage_slug: &str,
        slugs: BTreeMap<String, String>,
    ) -> Result<(), RoutingError> {
        let mut state = self.write();
        let entity = state
            .entities
            .get_mut(&id)
            .ok_or(RoutingError::EntityNotFound(id))?;

        entity.slug = storage_slug.to_string();
        for (language, slug) in slugs {
            entity.slugs.insert(language, Some(slug));
        }
        state.version += 1;
        Ok(())
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.read().entities.keys().copied().collect()
    }
}

//! Entity graphs keyed by normalized name+source.
//!
//! Each domain loads into two independent graphs: a base graph holding
//! mechanical data and a fluff graph holding narrative data. The graphs
//! share a key space but nothing else; each is resolved on its own before
//! composition pairs them back up.

pub mod entity;
pub mod loader;

pub use entity::{BaseEntity, FluffEntity, ParentRef};
pub use loader::{load_base_graph, load_fluff_graph, Databank};

use ahash::AHashMap;

use crate::core::key::EntityKey;

/// One domain's entity collection, keyed by [`EntityKey`].
///
/// Insertion is last-write-wins: records whose identity normalizes to the
/// same key silently overwrite earlier ones, an accepted property of the
/// inconsistently-cased source data.
#[derive(Debug, Clone)]
pub struct EntityGraph<T> {
    entities: AHashMap<EntityKey, T>,
}

impl<T> EntityGraph<T> {
    pub fn new() -> Self {
        Self {
            entities: AHashMap::new(),
        }
    }

    /// Insert an entity, returning any entity it displaced
    pub fn insert(&mut self, key: EntityKey, entity: T) -> Option<T> {
        let displaced = self.entities.insert(key.clone(), entity);
        if displaced.is_some() {
            tracing::debug!(%key, "key collision, keeping later record");
        }
        displaced
    }

    pub fn get(&self, key: &EntityKey) -> Option<&T> {
        self.entities.get(key)
    }

    pub fn get_mut(&mut self, key: &EntityKey) -> Option<&mut T> {
        self.entities.get_mut(key)
    }

    pub fn remove(&mut self, key: &EntityKey) -> Option<T> {
        self.entities.remove(key)
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.entities.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &T)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T> Default for EntityGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for EntityGraph<T> {
    type Item = (EntityKey, T);
    type IntoIter = <AHashMap<EntityKey, T> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

//! Pairing of resolved base entities with their fluff counterparts.
//!
//! Composition runs only after both graphs are fully resolved. Every output
//! entity requires mechanical data; narrative data is optional and its
//! absence is not an error.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::error::{LoreError, Result};
use crate::core::key::EntityKey;
use crate::graph::entity::{BaseEntity, FluffEntity};
use crate::graph::EntityGraph;

/// Final output-ready entity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedEntity {
    pub mechanical: BaseEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<FluffEntity>,
}

/// Compose a single entity, taking it out of both graphs.
///
/// A missing base entity is an error; a missing fluff entity yields
/// `narrative: None`.
pub fn compose(
    key: &EntityKey,
    base: &mut EntityGraph<BaseEntity>,
    fluff: &mut EntityGraph<FluffEntity>,
) -> Result<ComposedEntity> {
    let mechanical = base
        .remove(key)
        .ok_or_else(|| LoreError::MissingBaseEntity(key.clone()))?;
    Ok(ComposedEntity {
        mechanical,
        narrative: fluff.remove(key),
    })
}

/// Compose every entity in the base graph, consuming both graphs.
///
/// The output is keyed and ordered deterministically for serialization.
/// Fluff entities without a base counterpart are dropped; they are
/// placeholders with nothing to display.
pub fn compose_all(
    base: EntityGraph<BaseEntity>,
    mut fluff: EntityGraph<FluffEntity>,
) -> BTreeMap<EntityKey, ComposedEntity> {
    base.into_iter()
        .map(|(key, mechanical)| {
            let narrative = fluff.remove(&key);
            (key, ComposedEntity {
                mechanical,
                narrative,
            })
        })
        .collect()
}

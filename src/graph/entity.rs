//! Entity shapes for the base and fluff graphs.
//!
//! Mechanical attributes are `Option` fields where `None` means "unset":
//! a record either supplies a value or leaves the slot open for an ancestor
//! to fill. Present-but-falsy values (empty string, zero) are still present
//! and never treated as unset.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::error::{LoreError, Result};
use crate::core::key::EntityKey;
use crate::modify::{parse_modifications, ModContext, Modification};
use crate::render::flatten::Description;
use crate::render::urls::image_entry_url;
use crate::resolve::{accumulate, fallback, fallback_map, Inherit, ResolveOptions};

/// Reference from a child record to the parent it inherits unset data from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentRef {
    pub name: String,
    pub source: String,
}

impl ParentRef {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.name, &self.source)
    }
}

/// Mechanical half of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseEntity {
    pub name: String,
    pub source: String,

    /// Size category (e.g. "Small")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Creature type / subtype (e.g. "Humanoid")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creature_type: Option<String>,
    /// Spell that summons this entity, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summoned_by_spell: Option<String>,
    /// Numeric stat block; `None` is unset, an empty map is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<BTreeMap<String, i64>>,
    /// Whether a token image exists for this entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_token: Option<bool>,

    /// Inline rule text, child-then-ancestor order after resolution
    pub entries: Vec<Description>,
    /// Image URLs appended by modifications
    pub images: Vec<String>,

    /// Unresolved parent reference; cleared by the resolver
    #[serde(skip)]
    pub parent: Option<ParentRef>,
    /// Parsed overlay directives; consumed by the resolver
    #[serde(skip)]
    pub mods: Option<BTreeMap<String, Modification>>,
}

/// Narrative half of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluffEntity {
    pub name: String,
    pub source: String,

    /// Flattened narrative text, child-then-ancestor order after resolution
    pub description: Vec<Description>,
    /// Fully-qualified image URLs
    pub images: Vec<String>,

    /// Independent of the base entity's parent; fluff records often inherit
    /// from fluff-only placeholder entities
    #[serde(skip)]
    pub parent: Option<ParentRef>,
    #[serde(skip)]
    pub mods: Option<BTreeMap<String, Modification>>,
}

impl BaseEntity {
    /// Construct from a raw mechanical record. `name` and `source` are
    /// required; everything else is unset when absent.
    pub fn from_json(record: &Value, ctx: &ModContext<'_>) -> Result<Self> {
        let name = required_str(record, "name")?;
        let source = required_str(record, "source")?;
        let key = EntityKey::new(&name, &source);

        let entries = record
            .get("entries")
            .and_then(Value::as_array)
            .map(|list| ctx.flattener.flatten(list, key.as_str()))
            .unwrap_or_default();

        Ok(Self {
            size: scalar_string(record.get("size")),
            creature_type: type_string(record.get("type")),
            summoned_by_spell: record
                .get("summonedBySpell")
                .and_then(Value::as_str)
                .map(strip_source_suffix),
            stats: stat_block(record.get("stats")),
            has_token: record.get("hasToken").and_then(Value::as_bool),
            entries,
            images: Vec::new(),
            parent: parent_ref(record)?,
            mods: parse_modifications(key.as_str(), mod_block(record), ctx)?,
            name,
            source,
        })
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.name, &self.source)
    }
}

impl FluffEntity {
    /// Construct from a raw narrative record
    pub fn from_json(record: &Value, ctx: &ModContext<'_>) -> Result<Self> {
        let name = required_str(record, "name")?;
        let source = required_str(record, "source")?;
        let key = EntityKey::new(&name, &source);

        let description = record
            .get("entries")
            .and_then(Value::as_array)
            .map(|list| ctx.flattener.flatten(list, key.as_str()))
            .unwrap_or_default();

        let mut images = Vec::new();
        if let Some(list) = record.get("images").and_then(Value::as_array) {
            for entry in list {
                if let Some(url) = image_entry_url(key.as_str(), entry, ctx.image_base)? {
                    images.push(url);
                }
            }
        }

        Ok(Self {
            description,
            images,
            parent: parent_ref(record)?,
            mods: parse_modifications(key.as_str(), mod_block(record), ctx)?,
            name,
            source,
        })
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.name, &self.source)
    }
}

impl Inherit for BaseEntity {
    fn parent_ref(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn take_parent(&mut self) -> Option<ParentRef> {
        self.parent.take()
    }

    fn take_mods(&mut self) -> Option<BTreeMap<String, Modification>> {
        self.mods.take()
    }

    // Merge strategy is chosen per field: scalars fall back, lists always
    // accumulate in child-then-parent order.
    fn inherit_from(&mut self, parent: &Self, options: &ResolveOptions) {
        fallback(&mut self.size, &parent.size);
        fallback(&mut self.creature_type, &parent.creature_type);
        fallback(&mut self.summoned_by_spell, &parent.summoned_by_spell);
        fallback_map(&mut self.stats, &parent.stats, options.empty_stats_inherit);
        fallback(&mut self.has_token, &parent.has_token);
        accumulate(&mut self.entries, &parent.entries);
        accumulate(&mut self.images, &parent.images);
    }

    fn apply_modification(&mut self, modification: &Modification) {
        accumulate(&mut self.entries, &modification.text);
        accumulate(&mut self.images, &modification.images);
    }
}

impl Inherit for FluffEntity {
    fn parent_ref(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn take_parent(&mut self) -> Option<ParentRef> {
        self.parent.take()
    }

    fn take_mods(&mut self) -> Option<BTreeMap<String, Modification>> {
        self.mods.take()
    }

    fn inherit_from(&mut self, parent: &Self, _options: &ResolveOptions) {
        accumulate(&mut self.description, &parent.description);
        accumulate(&mut self.images, &parent.images);
    }

    fn apply_modification(&mut self, modification: &Modification) {
        accumulate(&mut self.description, &modification.text);
        accumulate(&mut self.images, &modification.images);
    }
}

fn required_str(record: &Value, field: &'static str) -> Result<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(LoreError::MissingField { field })
}

/// Extract the `_copy` parent reference, if any. A `_copy` block without
/// identity fields is a contract violation, same as a record without them.
fn parent_ref(record: &Value) -> Result<Option<ParentRef>> {
    let Some(copy) = record.get("_copy") else {
        return Ok(None);
    };
    Ok(Some(ParentRef {
        name: required_str(copy, "name")?,
        source: required_str(copy, "source")?,
    }))
}

/// Locate the record's modification block. Newer records carry `_mod` at the
/// top level; older ones nest it inside `_copy`.
fn mod_block(record: &Value) -> Option<&Value> {
    record
        .get("_mod")
        .or_else(|| record.get("_copy").and_then(|c| c.get("_mod")))
}

/// A scalar that may arrive as a string or a single-element list
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(list)) => list.first().and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// Creature type arrives as a plain string or as `{"type": "..."}`
fn type_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj.get("type").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}

/// Spell references carry a source suffix after a pipe; only the name matters
fn strip_source_suffix(raw: &str) -> String {
    raw.split('|').next().unwrap_or(raw).to_string()
}

fn stat_block(value: Option<&Value>) -> Option<BTreeMap<String, i64>> {
    let Some(Value::Object(obj)) = value else {
        return None;
    };
    Some(
        obj.iter()
            .filter_map(|(k, v)| v.as_i64().map(|n| (k.clone(), n)))
            .collect(),
    )
}

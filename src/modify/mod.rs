//! Overlay directives attached to parent-referencing records.
//!
//! A record that inherits from a parent may carry a block of named
//! modifications layered on top of the inherited data. Each block is parsed
//! once at load time into a typed list of append-operations; the resolver
//! only ever replays the already-flattened results.
//!
//! Item kinds form a closed set. Anything outside it is a fatal error:
//! silently dropping an unrecognized shape would produce missing rule text
//! with no trace, so new upstream shapes must fail loudly instead.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::error::{LoreError, Result};
use crate::render::flatten::{Description, EntryFlattener};
use crate::render::urls::image_entry_url;

/// Shared handles the modification parser needs from its collaborators
pub struct ModContext<'a> {
    pub flattener: &'a dyn EntryFlattener,
    pub image_base: &'a str,
}

/// One parsed modification block: an ordered list of append-operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modification {
    /// Raw mode tag from the source data, kept for reporting
    pub mode: String,
    /// Flattened narrative text to append
    pub text: Vec<Description>,
    /// Fully-qualified image URLs to append
    pub images: Vec<String>,
}

impl Modification {
    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.images.is_empty()
    }
}

/// Parse a record's modification block into named [`Modification`]s.
///
/// Returns `Ok(None)` when the block is absent or nothing in it was
/// recognized; an empty mapping is never returned. `owner` names the record
/// in diagnostics and errors.
pub fn parse_modifications(
    owner: &str,
    raw: Option<&Value>,
    ctx: &ModContext<'_>,
) -> Result<Option<BTreeMap<String, Modification>>> {
    let Some(Value::Object(blocks)) = raw else {
        return Ok(None);
    };

    let mut result = BTreeMap::new();
    for (name, block) in blocks {
        if let Some(modification) = parse_block(owner, block, ctx)? {
            result.insert(name.clone(), modification);
        }
    }

    if result.is_empty() {
        Ok(None)
    } else {
        Ok(Some(result))
    }
}

fn parse_block(
    owner: &str,
    block: &Value,
    ctx: &ModContext<'_>,
) -> Result<Option<Modification>> {
    let (mode, items): (&str, Vec<&Value>) = match block {
        Value::Object(obj) => {
            let mode = obj.get("mode").and_then(Value::as_str).unwrap_or("append");
            // "items" may be a single entry or a list of them
            let items = match obj.get("items") {
                Some(Value::Array(list)) => list.iter().collect(),
                Some(single) => vec![single],
                None => Vec::new(),
            };
            (mode, items)
        }
        // Older records put a bare item list where the block should be
        Value::Array(list) => ("append", list.iter().collect()),
        _ => {
            // Scalar directives (e.g. a bare "remove") are a known, tolerated gap
            tracing::debug!(owner, "skipping scalar modification block");
            return Ok(None);
        }
    };

    let mut modification = Modification {
        mode: mode.to_string(),
        text: Vec::new(),
        images: Vec::new(),
    };

    for item in items {
        parse_item(owner, item, ctx, &mut modification)?;
    }

    if modification.is_empty() {
        Ok(None)
    } else {
        Ok(Some(modification))
    }
}

fn parse_item(
    owner: &str,
    item: &Value,
    ctx: &ModContext<'_>,
    modification: &mut Modification,
) -> Result<()> {
    let Value::Object(obj) = item else {
        // Unstructured scalar items are unsupported but harmless
        tracing::debug!(owner, "skipping scalar modification item");
        return Ok(());
    };

    let kind = obj.get("type").and_then(Value::as_str).unwrap_or("");
    match kind {
        "entries" | "section" => {
            // Sub-items live under "entries", or under "items" in older records
            let nested = obj
                .get("entries")
                .or_else(|| obj.get("items"))
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut text = ctx.flattener.flatten(nested, owner);
            if let Some(name) = obj.get("name").and_then(Value::as_str) {
                if let Some(first) = text.first_mut() {
                    if first.heading.is_empty() {
                        first.heading = name.to_string();
                    }
                }
            }
            modification.text.append(&mut text);
        }
        "image" => {
            if let Some(url) = image_entry_url(owner, item, ctx.image_base)? {
                modification.images.push(url);
            }
        }
        // Recognized but intentionally produce nothing
        "inset" | "insetReadaloud" => {}
        other => {
            return Err(LoreError::UnknownModificationKind {
                entity: owner.to_string(),
                kind: other.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::flatten::PlainFlattener;
    use serde_json::json;

    fn ctx(flattener: &PlainFlattener) -> ModContext<'_> {
        ModContext {
            flattener,
            image_base: "https://5e.tools/img/",
        }
    }

    fn parse(raw: &Value) -> Result<Option<BTreeMap<String, Modification>>> {
        let flattener = PlainFlattener;
        parse_modifications("goblin (mm)", Some(raw), &ctx(&flattener))
    }

    #[test]
    fn test_absent_block_is_none() {
        let flattener = PlainFlattener;
        let result = parse_modifications("goblin (mm)", None, &ctx(&flattener)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_entries_item_flattens_text() {
        let raw = json!({
            "traits": {
                "mode": "appendArr",
                "items": {"type": "entries", "name": "Tactics", "entries": ["Swarms."]}
            }
        });
        let mods = parse(&raw).unwrap().unwrap();
        let m = &mods["traits"];
        assert_eq!(m.mode, "appendArr");
        assert_eq!(m.text, vec![Description::new("Tactics", "Swarms.")]);
    }

    #[test]
    fn test_section_item_is_accepted() {
        let raw = json!({
            "lore": {
                "items": [{"type": "section", "entries": ["A long history."]}]
            }
        });
        let mods = parse(&raw).unwrap().unwrap();
        assert_eq!(mods["lore"].text[0].body, "A long history.");
    }

    #[test]
    fn test_alternate_items_key_is_checked() {
        let raw = json!({
            "lore": {
                "items": [{"type": "entries", "items": ["Nested under items."]}]
            }
        });
        let mods = parse(&raw).unwrap().unwrap();
        assert_eq!(mods["lore"].text[0].body, "Nested under items.");
    }

    #[test]
    fn test_entries_key_preferred_over_items() {
        let raw = json!({
            "lore": {
                "items": [{
                    "type": "entries",
                    "entries": ["Primary."],
                    "items": ["Alternate."]
                }]
            }
        });
        let mods = parse(&raw).unwrap().unwrap();
        assert_eq!(mods["lore"].text[0].body, "Primary.");
    }

    #[test]
    fn test_image_item_becomes_url() {
        let raw = json!({
            "images": {
                "items": [{"type": "image", "href": {"type": "internal", "path": "tokens/MM/Goblin.webp"}}]
            }
        });
        let mods = parse(&raw).unwrap().unwrap();
        assert_eq!(
            mods["images"].images,
            vec!["https://5e.tools/img/tokens/MM/Goblin.webp"]
        );
    }

    #[test]
    fn test_inset_kinds_are_ignored_not_errors() {
        let raw = json!({
            "callouts": {
                "items": [
                    {"type": "inset", "entries": ["boxed text"]},
                    {"type": "insetReadaloud", "entries": ["read aloud"]}
                ]
            }
        });
        assert!(parse(&raw).unwrap().is_none());
    }

    #[test]
    fn test_scalar_items_are_skipped_silently() {
        let raw = json!({"notes": {"items": ["just a string", 7]}});
        assert!(parse(&raw).unwrap().is_none());
    }

    #[test]
    fn test_unknown_kind_is_fatal_and_named() {
        let raw = json!({"bad": {"items": [{"type": "frobnicate"}]}});
        let err = parse(&raw).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("frobnicate"));
        assert!(message.contains("goblin (mm)"));
    }

    #[test]
    fn test_empty_mapping_collapses_to_none() {
        let raw = json!({"empty": {"mode": "appendArr", "items": []}});
        assert!(parse(&raw).unwrap().is_none());
    }

    #[test]
    fn test_bare_array_block_parses_with_default_mode() {
        let raw = json!({
            "traits": [{"type": "entries", "entries": ["From a list."]}]
        });
        let mods = parse(&raw).unwrap().unwrap();
        assert_eq!(mods["traits"].mode, "append");
        assert_eq!(mods["traits"].text[0].body, "From a list.");
    }

    #[test]
    fn test_mode_defaults_when_absent() {
        let raw = json!({
            "traits": {"items": {"type": "entries", "entries": ["Text."]}}
        });
        let mods = parse(&raw).unwrap().unwrap();
        assert_eq!(mods["traits"].mode, "append");
    }
}

//! Source file loading and graph construction.
//!
//! The raw dataset is a directory of JSON files, each holding arrays under
//! domain keys ("monster", "monsterFluff", ...). All files are merged into
//! one databank before graphs are built, because a child's parent may live
//! in a file loaded later than the child.

use ahash::AHashMap;
use serde_json::Value;
use std::path::Path;

use super::entity::{BaseEntity, FluffEntity};
use super::EntityGraph;
use crate::core::error::Result;
use crate::modify::ModContext;

/// All source records, merged per top-level key across files
#[derive(Debug, Default)]
pub struct Databank {
    tables: AHashMap<String, Vec<Value>>,
}

impl Databank {
    /// Load and merge every eligible JSON file in a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut databank = Self::default();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if ignore_json_file(&path) {
                continue;
            }

            let contents = std::fs::read_to_string(&path)?;
            let data: Value = serde_json::from_str(&contents)?;
            let Value::Object(tables) = data else {
                continue;
            };

            for (key, value) in tables {
                if let Value::Array(mut records) = value {
                    databank
                        .tables
                        .entry(key)
                        .or_default()
                        .append(&mut records);
                }
            }
            tracing::debug!(path = %path.display(), "merged source file");
        }

        Ok(databank)
    }

    /// Records under a domain key; empty when the key never appeared
    pub fn records(&self, key: &str) -> &[Value] {
        self.tables.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// Foundry exports and changelogs sit next to the data files but are not
/// part of the dataset.
fn ignore_json_file(path: &Path) -> bool {
    if !path.is_file() {
        return true;
    }
    if path.extension().map_or(true, |ext| ext != "json") {
        return true;
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name.starts_with("foundry") || name.ends_with("changelog.json")
}

/// Build the base (mechanical) graph for one domain batch
pub fn load_base_graph(records: &[Value], ctx: &ModContext<'_>) -> Result<EntityGraph<BaseEntity>> {
    let mut graph = EntityGraph::new();
    for record in records {
        let entity = BaseEntity::from_json(record, ctx)?;
        graph.insert(entity.key(), entity);
    }
    Ok(graph)
}

/// Build the fluff (narrative) graph for one domain batch
pub fn load_fluff_graph(
    records: &[Value],
    ctx: &ModContext<'_>,
) -> Result<EntityGraph<FluffEntity>> {
    let mut graph = EntityGraph::new();
    for record in records {
        let entity = FluffEntity::from_json(record, ctx)?;
        graph.insert(entity.key(), entity);
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::key::EntityKey;
    use crate::render::flatten::PlainFlattener;
    use serde_json::json;
    use std::fs;

    fn ctx(flattener: &PlainFlattener) -> ModContext<'_> {
        ModContext {
            flattener,
            image_base: "https://5e.tools/img/",
        }
    }

    #[test]
    fn test_load_dir_merges_across_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bestiary-mm.json"),
            json!({"monster": [{"name": "Goblin", "source": "MM"}]}).to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("bestiary-vgm.json"),
            json!({"monster": [{"name": "Barghest", "source": "VGM"}]}).to_string(),
        )
        .unwrap();

        let databank = Databank::load_dir(dir.path()).unwrap();
        assert_eq!(databank.records("monster").len(), 2);
        assert!(databank.records("spell").is_empty());
    }

    #[test]
    fn test_load_dir_skips_foundry_and_changelog() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bestiary.json"),
            json!({"monster": [{"name": "Goblin", "source": "MM"}]}).to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("foundry-bestiary.json"),
            json!({"monster": [{"name": "Ignored", "source": "X"}]}).to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("changelog.json"),
            json!({"monster": [{"name": "Ignored", "source": "X"}]}).to_string(),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not json").unwrap();

        let databank = Databank::load_dir(dir.path()).unwrap();
        assert_eq!(databank.records("monster").len(), 1);
    }

    #[test]
    fn test_base_graph_insertion_under_normalized_key() {
        let flattener = PlainFlattener;
        let records = vec![json!({"name": "Goblin Boss", "source": "MM "})];
        let graph = load_base_graph(&records, &ctx(&flattener)).unwrap();
        assert!(graph.contains(&EntityKey::new("goblin boss", "mm")));
    }

    #[test]
    fn test_base_graph_last_write_wins() {
        let flattener = PlainFlattener;
        let records = vec![
            json!({"name": "Goblin", "source": "MM", "size": "S"}),
            json!({"name": "GOBLIN", "source": "mm", "size": "M"}),
        ];
        let graph = load_base_graph(&records, &ctx(&flattener)).unwrap();
        assert_eq!(graph.len(), 1);
        let entity = graph.get(&EntityKey::new("Goblin", "MM")).unwrap();
        assert_eq!(entity.size.as_deref(), Some("M"));
    }

    #[test]
    fn test_record_without_source_aborts_batch() {
        let flattener = PlainFlattener;
        let records = vec![json!({"name": "Goblin"})];
        assert!(load_base_graph(&records, &ctx(&flattener)).is_err());
    }
}

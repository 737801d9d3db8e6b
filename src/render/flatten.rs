//! Narrative-flattening collaborator seam.
//!
//! Raw rule text arrives as nested entry lists. The resolution engine only
//! needs ordered `(heading, body)` pairs out of them; how the prose itself
//! is formatted is not this crate's concern, so the contract is a trait and
//! the engine treats its output as leaf values.

use serde::Serialize;
use serde_json::Value;

/// One flattened block of narrative text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// Section heading, empty for unnamed paragraphs
    pub heading: String,
    /// Flattened body text
    pub body: String,
}

impl Description {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

/// Contract for turning a nested entry list into ordered text pairs.
///
/// `fallback_ref` identifies the owning record (typically its page URL or
/// key) and is used when an entry carries no renderable content of its own.
pub trait EntryFlattener {
    fn flatten(&self, entries: &[Value], fallback_ref: &str) -> Vec<Description>;
}

/// Minimal flattener: plain strings become paragraphs, one level of named
/// `entries`/`section` nesting becomes a headed block. Anything deeper or
/// fancier is out of scope here.
#[derive(Debug, Default)]
pub struct PlainFlattener;

impl EntryFlattener for PlainFlattener {
    fn flatten(&self, entries: &[Value], fallback_ref: &str) -> Vec<Description> {
        let mut result = Vec::new();
        let mut paragraphs: Vec<String> = Vec::new();

        for entry in entries {
            match entry {
                Value::String(text) => paragraphs.push(text.clone()),
                Value::Object(obj) => {
                    // Flush loose paragraphs before a named block
                    if !paragraphs.is_empty() {
                        result.push(Description::new("", paragraphs.join("\n")));
                        paragraphs.clear();
                    }

                    let heading = obj
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    let nested: Vec<String> = obj
                        .get("entries")
                        .and_then(Value::as_array)
                        .map(|list| {
                            list.iter()
                                .filter_map(Value::as_str)
                                .map(String::from)
                                .collect()
                        })
                        .unwrap_or_default();

                    if nested.is_empty() {
                        result.push(Description::new(heading, format!("See {}", fallback_ref)));
                    } else {
                        result.push(Description::new(heading, nested.join("\n")));
                    }
                }
                _ => {}
            }
        }

        if !paragraphs.is_empty() {
            result.push(Description::new("", paragraphs.join("\n")));
        }

        result
    }
}

//! Canonical lookup keys for name+source entity identity.
//!
//! Source data is inconsistent about casing and stray whitespace, so both
//! parts are trimmed and lowercased before being combined. Records whose raw
//! identity differs only by case or whitespace collide to the same key;
//! graph insertion is last-write-wins for such collisions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized `(name, source)` lookup key, formatted `"<name> (<source>)"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey(String);

impl EntityKey {
    /// Build a key from raw identity fields. Pure and total: empty parts are
    /// passed through, since identity validation is the loader's job.
    pub fn new(name: &str, source: &str) -> Self {
        Self(format!(
            "{} ({})",
            name.trim().to_lowercase(),
            source.trim().to_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = EntityKey::new("Goblin", "MM");
        assert_eq!(key.as_str(), "goblin (mm)");
    }

    #[test]
    fn test_case_and_whitespace_collide() {
        assert_eq!(
            EntityKey::new("Goblin Boss", "MM "),
            EntityKey::new("goblin boss", "mm")
        );
    }

    #[test]
    fn test_distinct_identities_differ() {
        assert_ne!(
            EntityKey::new("Goblin", "MM"),
            EntityKey::new("Goblin", "VGM")
        );
    }

    #[test]
    fn test_empty_parts_pass_through() {
        let key = EntityKey::new("", "");
        assert_eq!(key.as_str(), " ()");
    }
}

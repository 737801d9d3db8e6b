//! URL construction for image resources.
//!
//! Resource paths in the source data contain spaces; generated URLs must be
//! whitespace-escaped but otherwise preserve the original casing, since the
//! upstream file host is case-sensitive.

use serde_json::Value;

use crate::core::error::{LoreError, Result};

/// Escape whitespace in a URL
pub fn clean_url(url: &str) -> String {
    url.replace(' ', "%20")
}

/// Build a fully-qualified URL for a relative image resource path
pub fn image_url(base: &str, path: &str) -> String {
    clean_url(&format!("{}{}", base, path))
}

/// Resolve one image entry to a URL.
///
/// Returns `Ok(None)` for entries that are not images. Internal hrefs are
/// prefixed with the base URL, external hrefs pass through unchanged, and
/// any other href type is a fatal schema error.
pub fn image_entry_url(owner: &str, entry: &Value, base: &str) -> Result<Option<String>> {
    if entry.get("type").and_then(Value::as_str) != Some("image") {
        return Ok(None);
    }

    let href = entry.get("href").cloned().unwrap_or(Value::Null);
    let href_type = href.get("type").and_then(Value::as_str).unwrap_or("");
    let path = href.get("path").and_then(Value::as_str).unwrap_or("");

    match href_type {
        "internal" => Ok(Some(image_url(base, path))),
        "external" => Ok(Some(clean_url(path))),
        other => Err(LoreError::UnknownImageHref {
            entity: owner.to_string(),
            href_type: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://5e.tools/img/";

    #[test]
    fn test_clean_url_escapes_spaces() {
        assert_eq!(
            clean_url("https://example.com/Goblin Boss.webp"),
            "https://example.com/Goblin%20Boss.webp"
        );
    }

    #[test]
    fn test_image_url_preserves_casing() {
        assert_eq!(
            image_url(BASE, "bestiary/MM/Goblin.webp"),
            "https://5e.tools/img/bestiary/MM/Goblin.webp"
        );
    }

    #[test]
    fn test_internal_href() {
        let entry = json!({"type": "image", "href": {"type": "internal", "path": "a/b.webp"}});
        let url = image_entry_url("goblin", &entry, BASE).unwrap();
        assert_eq!(url, Some("https://5e.tools/img/a/b.webp".to_string()));
    }

    #[test]
    fn test_external_href_passes_through() {
        let entry =
            json!({"type": "image", "href": {"type": "external", "path": "https://x.test/i.png"}});
        let url = image_entry_url("goblin", &entry, BASE).unwrap();
        assert_eq!(url, Some("https://x.test/i.png".to_string()));
    }

    #[test]
    fn test_non_image_entry_is_skipped() {
        let entry = json!({"type": "gallery"});
        assert_eq!(image_entry_url("goblin", &entry, BASE).unwrap(), None);
    }

    #[test]
    fn test_unknown_href_type_is_fatal() {
        let entry = json!({"type": "image", "href": {"type": "teleport", "path": "x"}});
        let err = image_entry_url("goblin", &entry, BASE).unwrap_err();
        assert!(err.to_string().contains("teleport"));
        assert!(err.to_string().contains("goblin"));
    }
}

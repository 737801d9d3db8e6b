//! Conversion pipeline configuration.
//!
//! Settings that vary between deployments of the converter are collected
//! here with explanations of what they affect. Everything has a sensible
//! default; a TOML file can override individual fields.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::error::{LoreError, Result};

/// Configuration for the conversion pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory holding the raw ruleset JSON files
    pub data_dir: PathBuf,

    /// Directory the flattened output JSON is written to
    pub output_dir: PathBuf,

    /// Base URL prepended to internal image resource paths
    ///
    /// Image references in the source data are relative paths; they are
    /// converted to fully-qualified URLs under this base.
    pub image_base_url: String,

    /// Whether a present-but-empty stat map counts as unset during
    /// inheritance
    ///
    /// When true, a child whose stat map is present but empty still falls
    /// back to its parent's stats. When false (the default, matching the
    /// upstream dataset's observable behavior), any present map wins.
    pub empty_stats_inherit: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            image_base_url: "https://5e.tools/img/".to_string(),
            empty_stats_inherit: false,
        }
    }
}

impl ConvertConfig {
    /// Load configuration from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| LoreError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.empty_stats_inherit);
        assert!(config.image_base_url.ends_with('/'));
    }

    #[test]
    fn test_partial_toml_override() {
        let config: ConvertConfig = toml::from_str(
            r#"
            data_dir = "fixtures"
            empty_stats_inherit = true
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("fixtures"));
        assert!(config.empty_stats_inherit);
        // Unset fields keep their defaults
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }
}

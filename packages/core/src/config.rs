//! Engine Configuration
//!
//! Tunables for search, hierarchy traversal and write policies. Every field
//! has a serde default so partial JSON files deserialize cleanly, and a small
//! set of `WIKISPACE_*` environment variables can override a loaded config.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound accepted for `max_hierarchy_depth`
///
/// Trees this deep are still serialized and dropped recursively.
pub const MAX_SUPPORTED_DEPTH: usize = 1000;

fn default_search_limit() -> usize {
    20
}

fn default_search_max_limit() -> usize {
    1000
}

fn default_excerpt_length() -> usize {
    150
}

fn default_highlight_open() -> String {
    "<mark>".to_string()
}

fn default_highlight_close() -> String {
    "</mark>".to_string()
}

fn default_max_hierarchy_depth() -> usize {
    100
}

fn default_max_title_length() -> usize {
    255
}

fn default_recent_visits_limit() -> usize {
    20
}

fn default_activity_feed_limit() -> usize {
    50
}

/// Runtime configuration for the document engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Results returned by search when the caller gives no limit
    #[serde(default = "default_search_limit")]
    pub search_default_limit: usize,

    /// Hard cap on any search limit
    #[serde(default = "default_search_max_limit")]
    pub search_max_limit: usize,

    /// Maximum characters in a search excerpt
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,

    /// Marker inserted before each highlighted match
    #[serde(default = "default_highlight_open")]
    pub highlight_open: String,

    /// Marker inserted after each highlighted match
    #[serde(default = "default_highlight_close")]
    pub highlight_close: String,

    /// Bound on ancestor walks and tree depth; deeper chains are corruption
    #[serde(default = "default_max_hierarchy_depth")]
    pub max_hierarchy_depth: usize,

    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,

    /// Suffix colliding slugs within a space (`-2`, `-3`, ...)
    #[serde(default)]
    pub enforce_unique_slugs: bool,

    /// Send the loaded version with editor saves and reject stale writes
    #[serde(default)]
    pub detect_version_conflicts: bool,

    #[serde(default = "default_recent_visits_limit")]
    pub recent_visits_limit: usize,

    #[serde(default = "default_activity_feed_limit")]
    pub activity_feed_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_default_limit: default_search_limit(),
            search_max_limit: default_search_max_limit(),
            excerpt_length: default_excerpt_length(),
            highlight_open: default_highlight_open(),
            highlight_close: default_highlight_close(),
            max_hierarchy_depth: default_max_hierarchy_depth(),
            max_title_length: default_max_title_length(),
            enforce_unique_slugs: false,
            detect_version_conflicts: false,
            recent_visits_limit: default_recent_visits_limit(),
            activity_feed_limit: default_activity_feed_limit(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).context("Failed to parse engine config")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Load a JSON config file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Apply `WIKISPACE_*` environment overrides
    ///
    /// - `WIKISPACE_SEARCH_LIMIT` → `search_default_limit`
    /// - `WIKISPACE_EXCERPT_LENGTH` → `excerpt_length`
    /// - `WIKISPACE_MAX_DEPTH` → `max_hierarchy_depth`
    /// - `WIKISPACE_UNIQUE_SLUGS` → `enforce_unique_slugs`
    /// - `WIKISPACE_DETECT_CONFLICTS` → `detect_version_conflicts`
    ///
    /// Unparseable values are ignored with a warning. The result is
    /// validated again, so an override cannot produce a config that
    /// [`EngineConfig::load`] would have rejected.
    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup, then validate
    pub fn with_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Option<T> {
            let raw = raw?;
            match raw.trim().parse::<T>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid value {:?} for {}", raw, name);
                    None
                }
            }
        }

        if let Some(v) = parse("WIKISPACE_SEARCH_LIMIT", lookup("WIKISPACE_SEARCH_LIMIT")) {
            self.search_default_limit = v;
        }
        if let Some(v) = parse("WIKISPACE_EXCERPT_LENGTH", lookup("WIKISPACE_EXCERPT_LENGTH")) {
            self.excerpt_length = v;
        }
        if let Some(v) = parse("WIKISPACE_MAX_DEPTH", lookup("WIKISPACE_MAX_DEPTH")) {
            self.max_hierarchy_depth = v;
        }
        if let Some(v) = parse("WIKISPACE_UNIQUE_SLUGS", lookup("WIKISPACE_UNIQUE_SLUGS")) {
            self.enforce_unique_slugs = v;
        }
        if let Some(v) = parse(
            "WIKISPACE_DETECT_CONFLICTS",
            lookup("WIKISPACE_DETECT_CONFLICTS"),
        ) {
            self.detect_version_conflicts = v;
        }

        self.validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid config after environment overrides")?;
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.search_default_limit == 0 {
            return Err("searchDefaultLimit must be greater than 0".to_string());
        }

        if self.search_max_limit == 0 {
            return Err("searchMaxLimit must be greater than 0".to_string());
        }

        if self.search_default_limit > self.search_max_limit {
            return Err(format!(
                "searchDefaultLimit ({}) cannot exceed searchMaxLimit ({})",
                self.search_default_limit, self.search_max_limit
            ));
        }

        if self.excerpt_length == 0 {
            return Err("excerptLength must be greater than 0".to_string());
        }

        if self.highlight_open.is_empty() || self.highlight_close.is_empty() {
            return Err("highlight markers cannot be empty".to_string());
        }

        if self.max_hierarchy_depth == 0 || self.max_hierarchy_depth > MAX_SUPPORTED_DEPTH {
            return Err(format!(
                "maxHierarchyDepth must be between 1 and {}",
                MAX_SUPPORTED_DEPTH
            ));
        }

        if self.max_title_length == 0 {
            return Err("maxTitleLength must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.search_default_limit, 20);
        assert_eq!(config.excerpt_length, 150);
        assert_eq!(config.highlight_open, "<mark>");
        assert!(!config.enforce_unique_slugs);
        assert!(!config.detect_version_conflicts);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "excerptLength": 80 }"#).unwrap();
        assert_eq!(config.excerpt_length, 80);
        assert_eq!(config.search_default_limit, 20);
        assert_eq!(config.max_hierarchy_depth, 100);
    }

    #[test]
    fn test_invalid_json_config_rejected() {
        assert!(EngineConfig::from_json_str(r#"{ "searchDefaultLimit": 0 }"#).is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.search_default_limit = 2000;
        assert!(config.validate().is_err());

        config.search_default_limit = 20;
        config.highlight_close = String::new();
        assert!(config.validate().is_err());

        config.highlight_close = "</b>".to_string();
        config.max_hierarchy_depth = 0;
        assert!(config.validate().is_err());

        config.max_hierarchy_depth = MAX_SUPPORTED_DEPTH + 1;
        assert!(config.validate().is_err());

        config.max_hierarchy_depth = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("WIKISPACE_SEARCH_LIMIT", "5"),
            ("WIKISPACE_UNIQUE_SLUGS", "true"),
            ("WIKISPACE_MAX_DEPTH", "not-a-number"),
        ]);

        let config = EngineConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.search_default_limit, 5);
        assert!(config.enforce_unique_slugs);
        assert_eq!(config.max_hierarchy_depth, 100);
    }

    #[test]
    fn test_overrides_are_validated() {
        let zero_limit = EngineConfig::default().with_overrides(|name| {
            (name == "WIKISPACE_SEARCH_LIMIT").then(|| "0".to_string())
        });
        assert!(zero_limit.is_err());

        let too_deep = EngineConfig::default().with_overrides(|name| {
            (name == "WIKISPACE_MAX_DEPTH").then(|| (MAX_SUPPORTED_DEPTH + 1).to_string())
        });
        let err = too_deep.unwrap_err();
        assert!(format!("{:#}", err).contains("maxHierarchyDepth"));

        let deepest = EngineConfig::default()
            .with_overrides(|name| {
                (name == "WIKISPACE_MAX_DEPTH").then(|| MAX_SUPPORTED_DEPTH.to_string())
            })
            .unwrap();
        assert_eq!(deepest.max_hierarchy_depth, MAX_SUPPORTED_DEPTH);

        let no_excerpt = EngineConfig::default().with_overrides(|name| {
            (name == "WIKISPACE_EXCERPT_LENGTH").then(|| "0".to_string())
        });
        assert!(no_excerpt.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load(temp_dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wikispace.json");
        tokio::fs::write(&path, r#"{ "detectVersionConflicts": true, "searchMaxLimit": 50 }"#)
            .await
            .unwrap();

        let config = EngineConfig::load(&path).await.unwrap();
        assert!(config.detect_version_conflicts);
        assert_eq!(config.search_max_limit, 50);
    }
}

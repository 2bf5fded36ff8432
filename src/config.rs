//! @ai:module:intent Configuration file for the highlighter CLI
//! @ai:module:layer infrastructure
//! @ai:module:public_api HighlighterConfig, LogConfig
//! @ai:module:depends_on session
//! @ai:module:stateless true

use crate::session::SessionDefaults;
use serde::{Deserialize, Serialize};

/// @ai:intent Main configuration, read from TOML
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighlighterConfig {
    #[serde(default)]
    pub defaults: SessionDefaults,
    #[serde(default)]
    pub log: LogConfig,
}

/// @ai:intent Logging configuration
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl HighlighterConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::LabelSet;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: HighlighterConfig = toml::from_str("").unwrap();
        assert_eq!(config, HighlighterConfig::default());
        assert_eq!(config.defaults.labels.as_slice(), ["PERSON".to_string(), "ORG".to_string()]);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_partial_defaults_section() {
        let config: HighlighterConfig = toml::from_str(
            r##"
[defaults]
labels = ["DATE", "PLACE"]
colors = ["#aa0000", "#00aa00"]

[log]
level = "debug"
"##,
        )
        .unwrap();

        assert_eq!(config.defaults.labels, LabelSet::new(["DATE", "PLACE"]).unwrap());
        assert_eq!(
            config.defaults.colors,
            Some(vec!["#aa0000".to_string(), "#00aa00".to_string()])
        );
        assert!(config.defaults.show_label_selector);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let result: Result<HighlighterConfig, _> = toml::from_str(
            r#"
[defaults]
labels = ["DATE", "DATE"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("highlighter.toml");

        let mut config = HighlighterConfig::default();
        config.defaults.show_label_selector = false;
        config.save(&path).unwrap();

        assert_eq!(HighlighterConfig::load(&path).unwrap(), config);
    }
}

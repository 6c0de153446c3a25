//! Editor configuration loaded from TOML
//!
//! ```toml
//! [layout]
//! member_height = 24
//! routing = "direct"
//!
//! [interchange]
//! min_canvas_size = 2000
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::interchange::ImportOptions;
use crate::layout::LayoutConfig;
use crate::model::DiagramType;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for importing interchange documents
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InterchangeConfig {
    /// Lower bound for each canvas dimension on import
    pub min_canvas_size: f64,
    /// Grid size used when a document has none
    pub default_grid_size: f64,
}

impl Default for InterchangeConfig {
    fn default() -> Self {
        Self {
            min_canvas_size: 1600.0,
            default_grid_size: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub interchange: InterchangeConfig,
}

impl EditorConfig {
    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Import options for a diagram of `diagram_type`
    pub fn import_options(&self, diagram_type: DiagramType) -> ImportOptions {
        ImportOptions {
            diagram_type,
            min_canvas_size: self.interchange.min_canvas_size,
            default_grid_size: self.interchange.default_grid_size,
            layout: self.layout.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RoutingMode;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EditorConfig::from_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = EditorConfig::from_str(
            r#"
            [layout]
            member_height = 24.0
            routing = "direct"

            [interchange]
            min_canvas_size = 2000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.member_height, 24.0);
        assert_eq!(config.layout.header_height, 40.0);
        assert_eq!(config.layout.routing, Some(RoutingMode::Direct));
        assert_eq!(config.interchange.min_canvas_size, 2000.0);
        assert_eq!(config.interchange.default_grid_size, 10.0);
    }

    #[test]
    fn test_import_options_carry_settings() {
        let mut config = EditorConfig::default();
        config.interchange.default_grid_size = 20.0;
        let options = config.import_options(DiagramType::ActivityDiagram);
        assert_eq!(options.diagram_type, DiagramType::ActivityDiagram);
        assert_eq!(options.default_grid_size, 20.0);
        assert_eq!(options.min_canvas_size, 1600.0);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_str("[layout\nmember_height = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}

#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! Loadable from TOML or JSON; every field has a default.
//!
//! ```toml
//! max_indent_depth = 8
//! create_node_in_empty_parent = true
//!
//! [history]
//! max_depth = 500
//! coalesce = true
//! ```

use std::path::Path;

use outline_undo::HistoryConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    /// An element can be indented while `depth + subtree height` is below this.
    pub max_indent_depth: usize,
    /// Typing into an empty document creates its first element.
    pub create_node_in_empty_parent: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            max_indent_depth: 10,
            create_node_in_empty_parent: true,
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.history.validate();
        if self.max_indent_depth == 0 {
            errors.push("max_indent_depth must be at least 1".to_owned());
        }
        errors
    }

    /// `self` if valid, else every validation error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

//! YAML configuration for the `sne` binary

use serde::Deserialize;
use sne_model::{ExtractOptions, SchemaFormat};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors while reading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config '{path}': {message}")]
    Invalid { path: String, message: String },
}

/// Settings read from `--config`
///
/// Every field is optional; command-line flags override the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Documentation language tried first for ODD customizations
    #[serde(default)]
    pub preferred_language: Option<String>,
    /// Largest accepted schema document in bytes
    #[serde(default)]
    pub max_input_bytes: Option<usize>,
    /// Deepest accepted element nesting
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Format used when neither content nor extension identify a file
    #[serde(default)]
    pub default_format: Option<SchemaFormat>,
}

impl CliConfig {
    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Invalid`] when it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&text).map_err(|message| ConfigError::Invalid {
            path: path.display().to_string(),
            message,
        })
    }

    fn from_yaml(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }

    /// Extraction options from this file, with `lang` taking precedence
    pub fn extract_options(&self, lang: Option<&str>) -> ExtractOptions {
        let mut options = ExtractOptions::new();
        if let Some(language) = lang.or(self.preferred_language.as_deref()) {
            options = options.preferred_language(language);
        }
        if let Some(limit) = self.max_input_bytes {
            options = options.max_input_bytes(limit);
        }
        if let Some(limit) = self.max_depth {
            options = options.max_depth(limit);
        }
        options
    }

    /// Detection fallback, XSD unless configured
    pub fn fallback_format(&self) -> SchemaFormat {
        self.default_format.unwrap_or(SchemaFormat::Xsd)
    }
}

//! Extraction options
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::model::SchemaFormat;
use crate::{Error, Result};

/// Default preferred documentation language for ODD customizations
pub const DEFAULT_LANGUAGE: &str = "de";

/// Default upper bound on the size of a source document (16 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

/// Default limit on element nesting in a source document
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options shared by all extractors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Language tried first when picking `desc`/`gloss` children (default: `de`)
    pub preferred_language: String,
    /// Largest accepted source document in bytes (default: 16 MiB)
    pub max_input_bytes: usize,
    /// Deepest accepted element nesting (default: 512)
    pub max_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preferred_language: DEFAULT_LANGUAGE.to_string(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ExtractOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred documentation language
    pub fn preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = language.into();
        self
    }

    /// Set the input size limit
    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }

    /// Set the element nesting limit
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Reject documents larger than the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for `format` when `text` is too large.
    pub fn check_size(&self, format: SchemaFormat, text: &str) -> Result<()> {
        if text.len() > self.max_input_bytes {
            return Err(Error::malformed(
                format,
                format!(
                    "document is {} bytes, larger than the {} byte limit",
                    text.len(),
                    self.max_input_bytes
                ),
            ));
        }
        Ok(())
    }
}

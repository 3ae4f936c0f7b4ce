#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-pipeline
//!
//! Turns schema documents into [`Schema`](sne_model::Schema) values.
//!
//! This crate detects a document's format, dispatches it to the matching
//! extractor, splices locally available XSD imports into the main document,
//! and merges standalone Schematron rules into an already-loaded schema.

/// Format detection from content, extension or fallback.
pub mod detect;
/// Splicing of locally available XSD imports.
pub mod imports;
/// Format dispatch and Schematron merging.
pub mod loader;

/// Format detection entry points.
pub use detect::{detect_format, detect_format_or, format_from_extension};
/// Import sources and merging.
pub use imports::{FileSystemSource, ImportSource, merge_imports};
/// Schema loading entry points.
pub use loader::{load_path, load_path_or, merge_schematron, parse_schema, parse_schema_tag};

use thiserror::Error;

/// Errors that can occur while loading a schema
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Extract(#[from] sne_model::Error),

    #[error("No schema loaded to merge Schematron rules into")]
    NoSchemaLoaded,

    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },
}

impl Error {
    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

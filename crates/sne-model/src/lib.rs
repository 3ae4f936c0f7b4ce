#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-model
//!
//! The unified schema graph every extractor produces.
//!
//! XSD, RelaxNG, TEI-ODD and Schematron documents all converge on the same
//! [`Schema`] value: named elements with merged child references, attributes,
//! model/attribute class memberships and Schematron rules. This crate also
//! holds the policies the extractors share:
//!
//! - [`merge`]: combining several occurrences of the same child reference
//!   into the loosest constraint, and content-kind priority
//! - [`resolve`]: cycle-guarded flattening of self-referential named graphs
//!   (groups, model classes, attribute classes)
//! - [`graph`]: reverse-index (parent) computation and final assembly
//! - [`record`]: the lossless key-value record form used for transport

/// Mutable element drafts and the builder that freezes them into a schema.
pub mod graph;
/// Order-preserving merge of child occurrences and attributes.
pub mod merge;
/// The unified schema graph and its value types.
pub mod model;
/// Options shared by every extractor.
pub mod options;
/// JSON record form of a schema.
pub mod record;
/// Cycle-guarded flattening and inlining of named definitions.
pub mod resolve;
/// Schematron rule context helpers.
pub mod rules;
/// Structural invariants of a finished schema.
pub mod verify;

/// Schema construction.
pub use graph::{ElementDraft, SchemaBuilder};
/// Deduplicating collections used while building elements.
pub use merge::{AttributeSet, ChildRefSet, merge_occurrence};
/// Schema graph types.
pub use model::{
    Attribute, ChildRef, Compositor, ContentKind, Element, MaxOccurs, RuleKind, Schema,
    SchemaFormat, SchematronRule,
};
/// Extraction options.
pub use options::ExtractOptions;
/// Transport form of a schema.
pub use record::{Entry, SchemaRecord};
/// Reference resolution primitives.
pub use resolve::{ExpansionStack, Member, flatten};
/// Element named by a rule context.
pub use rules::context_element;

use thiserror::Error;

/// Errors that can occur when extracting or transporting a schema
#[derive(Error, Debug)]
pub enum Error {
    /// The source document could not be read as the given format
    #[error("{} parse error: {message}", .format.display_name())]
    Malformed {
        format: SchemaFormat,
        message: String,
    },

    #[error("Unknown schema format: {0}")]
    UnknownFormat(String),

    /// A schema or record whose invariants do not hold
    #[error("Inconsistent schema: {0}")]
    Inconsistent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed-input error for `format`
    pub fn malformed(format: SchemaFormat, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            format,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

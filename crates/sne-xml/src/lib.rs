#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-xml
//!
//! Generic labeled-node tree for XML schema documents.
//!
//! Every schema format the engine understands (XSD, RelaxNG, TEI-ODD,
//! Schematron) is read into the same [`XmlNode`] structure: tag name,
//! namespace, attributes, ordered children and text. Extractors walk this
//! tree instead of depending on a particular document-object API.

/// Parsed document container and the text-to-tree reader.
pub mod document;
/// Source positions for error reporting.
pub mod metadata;
/// Core tree node model.
pub mod node;
/// Visitor and iterator helpers for walking trees.
pub mod traversal;
/// Subtree serialization back to XML text.
pub mod writer;

/// Parsed document type and the readers that build it.
pub use document::{DEFAULT_MAX_DEPTH, XmlDocument, parse_document, parse_document_with_depth};
/// Line and column of a byte offset.
pub use metadata::Position;
/// Tree node primitives and name helpers.
pub use node::{NodeKind, XmlNode, normalize_whitespace, split_qname, strip_prefix};
/// Depth-first walking entry points.
pub use traversal::{Descendants, Traversal, walk};
/// Serialization of a subtree back to XML text.
pub use writer::to_xml_string;

use thiserror::Error;

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Errors that can occur when reading or writing XML
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{message} at line {}, column {}", .position.line, .position.column)]
    Syntax { position: Position, message: String },

    #[error("unexpected end of document: <{open}> is not closed")]
    UnexpectedEof { open: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("invalid UTF-8: {0}")]
    Utf8(String),

    #[error("write error: {0}")]
    Write(String),
}

impl Error {
    /// Build a syntax error located at a byte offset of `text`.
    pub fn syntax(text: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position: Position::from_offset(text, offset),
            message: message.into(),
        }
    }
}

/// Crate-local result type for XML operations.
pub type Result<T> = std::result::Result<T, Error>;

#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-adapter-xsd
//!
//! Reads a W3C XML Schema into the unified schema graph.
//!
//! Extraction runs in four passes:
//!
//! 1. collect the top-level complex types, groups and attribute groups into
//!    an immutable [`XsdContext`], then walk every top-level element's
//!    content model
//! 2. expand group and attribute-group references (cycle-guarded), each
//!    expanded child taking the referencing occurrence's cardinality
//! 3. derive parent lists from the child edges
//! 4. sort and assemble the [`Schema`]
//!
//! Unnamed top-level declarations are skipped and unresolved references are
//! dropped; only a document that is not well-formed XML is an error.

/// Per-element content model extraction.
pub mod content;
/// Named types, groups and attribute groups of a schema document.
pub mod context;
/// Reference expansion and schema assembly.
pub mod resolve;

/// Top-level declarations indexed by name.
pub use context::XsdContext;

use sne_model::{Error, ExtractOptions, Result, Schema, SchemaFormat};
use sne_xml::{XmlNode, parse_document_with_depth};
use tracing::debug;

/// XML Schema namespace
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Parse XSD text into a schema named `name`.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the text is not well-formed XML or
/// exceeds the configured size limit.
pub fn parse_xsd(text: &str, name: &str, options: &ExtractOptions) -> Result<Schema> {
    options.check_size(SchemaFormat::Xsd, text)?;
    let document = parse_document_with_depth(text, options.max_depth)
        .map_err(|e| Error::malformed(SchemaFormat::Xsd, e))?;

    let context = XsdContext::extract(&document);
    debug!(
        "XSD context: {} complex types, {} groups, {} attribute groups",
        context.complex_type_count(),
        context.group_count(),
        context.attribute_group_count()
    );

    let raw = content::extract_elements(&document.root, &context, options.max_depth);
    Ok(resolve::assemble(name, raw, &context))
}

/// Element children of `node` in the XSD namespace (or no namespace)
pub(crate) fn xs_children<'a>(node: &'a XmlNode) -> impl Iterator<Item = &'a XmlNode> {
    node.element_children()
        .filter(|c| c.namespace.as_deref().is_none_or(|ns| ns == XS_NS))
}

/// First XSD child of `node` with the given local name
pub(crate) fn xs_child<'a>(node: &'a XmlNode, local_name: &str) -> Option<&'a XmlNode> {
    node.element_children().find(|c| c.is_named(local_name, XS_NS))
}

/// Normalized text of the node's direct `annotation/documentation`
pub(crate) fn documentation(node: &XmlNode) -> String {
    xs_child(node, "annotation")
        .and_then(|annotation| xs_child(annotation, "documentation"))
        .map(XmlNode::normalized_text)
        .unwrap_or_default()
}

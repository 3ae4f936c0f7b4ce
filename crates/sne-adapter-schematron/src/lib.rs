#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-adapter-schematron
//!
//! Reads Schematron `pattern`/`rule`/`assert`/`report` nodes into a flat,
//! document-ordered rule list.
//!
//! A Schematron document carries no element model. Loaded on its own it
//! yields a schema with one placeholder element per name its rule contexts
//! target; merged into another schema it only contributes rules.

/// Tree visitor that gathers rules in document order.
pub mod collector;

/// Rule gathering visitor.
pub use collector::RuleCollector;

use sne_model::{
    ContentKind, Error, ExtractOptions, Result, Schema, SchemaBuilder, SchemaFormat,
    SchematronRule,
};
use sne_xml::{XmlNode, parse_document_with_depth, walk};
use tracing::debug;

/// ISO Schematron namespace
pub const ISO_NS: &str = "http://purl.oclc.org/dsdl/schematron";

/// Schematron 1.5 namespace
pub const ASCC_NS: &str = "http://www.ascc.net/xml/schematron";

/// Namespaces whose elements are read as Schematron (besides no namespace)
pub const NAMESPACES: [&str; 3] = [ISO_NS, ASCC_NS, "http://purl.oclc.org/dml/schematron"];

/// Documentation of elements recovered from rule contexts
pub const PLACEHOLDER_DOCUMENTATION: &str = "Element referenced in Schematron rules";

/// Extract every rule of a Schematron document in document order.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the text is not well-formed XML or
/// exceeds the configured size limit.
pub fn extract_rules(text: &str, options: &ExtractOptions) -> Result<Vec<SchematronRule>> {
    options.check_size(SchemaFormat::Schematron, text)?;
    let document = parse_document_with_depth(text, options.max_depth)
        .map_err(|e| Error::malformed(SchemaFormat::Schematron, e))?;

    let mut collector = RuleCollector::new();
    walk(&document.root, &mut collector);
    let rules = collector.into_rules();
    debug!("Extracted {} Schematron rules", rules.len());
    Ok(rules)
}

/// Parse a standalone Schematron document into a schema named `name`.
///
/// # Errors
///
/// Same as [`extract_rules`].
pub fn parse_schematron(text: &str, name: &str, options: &ExtractOptions) -> Result<Schema> {
    let rules = extract_rules(text, options)?;

    let mut builder = SchemaBuilder::new(name, SchemaFormat::Schematron);
    for target in rules.iter().filter_map(SchematronRule::target) {
        if target == "*" || builder.contains_element(target) {
            continue;
        }
        let draft = builder.element_mut(target);
        draft.documentation = PLACEHOLDER_DOCUMENTATION.to_string();
        draft.content_kind = ContentKind::Unknown;
    }
    builder.rules(rules);

    Ok(builder.build())
}

/// Whether `node` is in a Schematron namespace or none
pub(crate) fn is_schematron(node: &XmlNode) -> bool {
    node.namespace
        .as_deref()
        .is_none_or(|ns| NAMESPACES.contains(&ns))
}

#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-adapter-odd
//!
//! Reads a TEI ODD customization into the unified schema graph.
//!
//! An ODD declares changes against the TEI vocabulary rather than a content
//! model, so the resulting elements carry documentation, attributes and class
//! memberships but never children or parents. Specs authored with
//! `mode="delete"` are left out.

/// Language-preferring selection of documentation children.
pub mod language;
/// Element, class and macro specifications of a customization.
pub mod specs;

use sne_model::{Error, ExtractOptions, Result, Schema, SchemaFormat};
use sne_xml::{XmlNode, parse_document_with_depth};
use tracing::debug;

/// TEI namespace
pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

/// Parse an ODD document into a schema named `name`.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the text is not well-formed XML, exceeds
/// the configured size limit, or contains no `schemaSpec`.
pub fn parse_odd(text: &str, name: &str, options: &ExtractOptions) -> Result<Schema> {
    options.check_size(SchemaFormat::Odd, text)?;
    let document = parse_document_with_depth(text, options.max_depth)
        .map_err(|e| Error::malformed(SchemaFormat::Odd, e))?;

    let schema_spec = find_schema_spec(&document.root)
        .ok_or_else(|| Error::malformed(SchemaFormat::Odd, "no <schemaSpec> found"))?;
    debug!(
        "ODD '{}': schemaSpec '{}'",
        name,
        schema_spec.attribute("ident").unwrap_or_default()
    );

    Ok(specs::extract(name, schema_spec, &options.preferred_language))
}

fn find_schema_spec(root: &XmlNode) -> Option<&XmlNode> {
    if root.is_named("schemaSpec", TEI_NS) {
        return Some(root);
    }
    root.descendants().find(|n| n.is_named("schemaSpec", TEI_NS))
}

/// Whether a spec node is authored as a deletion
pub(crate) fn is_deleted(node: &XmlNode) -> bool {
    node.attribute("mode") == Some("delete")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_schema_spec_is_malformed() {
        let err = parse_odd(
            r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text/></TEI>"#,
            "odd",
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "ODD parse error: no <schemaSpec> found");
    }

    #[test]
    fn test_schema_spec_as_root() {
        let schema = parse_odd(
            r#"<schemaSpec xmlns="http://www.tei-c.org/ns/1.0" ident="mini"><elementSpec ident="p"/></schemaSpec>"#,
            "mini",
            &ExtractOptions::default(),
        )
        .unwrap();
        assert_eq!(schema.element_names, vec!["p"]);
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_odd("<TEI>", "odd", &ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("ODD parse error: "));
    }
}

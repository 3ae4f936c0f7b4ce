#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # sne-adapter-rng
//!
//! Reads a RelaxNG grammar (XML syntax) into the unified schema graph.
//!
//! Defines are classified by the TEI naming conventions: `model.*` defines
//! are model classes, `att.*` (and `*.attributes`) defines are attribute
//! classes, `macro.*` defines are inlined, and defines wrapping an
//! `<element>` pattern declare elements. Model and attribute classes are
//! flattened with the shared cycle guard; macro inlining is guarded by the
//! stack of defines being expanded.

/// Content-model walking of element patterns.
pub mod content;
/// Named defines, combined and classified.
pub mod defines;
/// Class flattening, expansion and schema assembly.
pub mod resolve;

/// Define table and its entries.
pub use defines::{Define, DefineKind, DefineTable};

use sne_model::{Error, ExtractOptions, Result, Schema, SchemaFormat};
use sne_xml::{XmlNode, parse_document_with_depth};

/// RelaxNG structure namespace
pub const RNG_NS: &str = "http://relaxng.org/ns/structure/1.0";

/// RelaxNG DTD-compatibility annotations namespace
pub const ANNOTATIONS_NS: &str = "http://relaxng.org/ns/compatibility/annotations/1.0";

/// Parse a RelaxNG grammar into a schema named `name`.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the text is not well-formed XML or
/// exceeds the configured size limit.
pub fn parse_rng(text: &str, name: &str, options: &ExtractOptions) -> Result<Schema> {
    options.check_size(SchemaFormat::Rng, text)?;
    let document = parse_document_with_depth(text, options.max_depth)
        .map_err(|e| Error::malformed(SchemaFormat::Rng, e))?;

    let table = DefineTable::extract(&document.root);
    Ok(resolve::assemble(name, &table, options.max_depth))
}

/// RelaxNG pattern children of `node` (RelaxNG namespace or none)
pub(crate) fn rng_children<'a>(node: &'a XmlNode) -> impl Iterator<Item = &'a XmlNode> {
    node.element_children()
        .filter(|c| c.namespace.as_deref().is_none_or(|ns| ns == RNG_NS))
}

/// Text of the first direct `a:documentation`, else `desc`, child
pub(crate) fn documentation(node: &XmlNode) -> Option<String> {
    let annotation = node.element_children().find(|c| {
        c.local_name == "documentation"
            && (c.namespace.as_deref() == Some(ANNOTATIONS_NS) || c.prefix.as_deref() == Some("a"))
    });
    annotation
        .or_else(|| node.find_child("desc"))
        .map(XmlNode::normalized_text)
}

/// `name` attribute, else the text of a `name` child pattern
pub(crate) fn pattern_name(node: &XmlNode) -> Option<String> {
    if let Some(name) = node.non_empty_attribute("name") {
        return Some(name.trim().to_string());
    }
    rng_children(node)
        .find(|c| c.local_name == "name")
        .map(XmlNode::normalized_text)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sne_xml::parse_document;

    #[test]
    fn test_malformed_input_names_format() {
        let err = parse_rng("<grammar><define>", "broken", &ExtractOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("RelaxNG parse error: "));
    }

    #[test]
    fn test_documentation_prefers_annotation() {
        let doc = parse_document(
            r#"<element xmlns="http://relaxng.org/ns/structure/1.0"
                        xmlns:a="http://relaxng.org/ns/compatibility/annotations/1.0"
                        xmlns:tei="http://www.tei-c.org/ns/1.0" name="p">
                 <tei:desc>from desc</tei:desc>
                 <a:documentation> (paragraph)   marks paragraphs </a:documentation>
               </element>"#,
        )
        .unwrap();
        assert_eq!(
            documentation(&doc.root).as_deref(),
            Some("(paragraph) marks paragraphs")
        );
    }

    #[test]
    fn test_pattern_name_from_child() {
        let doc = parse_document(
            r#"<element xmlns="http://relaxng.org/ns/structure/1.0"><name ns="urn:x"> egXML </name><empty/></element>"#,
        )
        .unwrap();
        assert_eq!(pattern_name(&doc.root).as_deref(), Some("egXML"));
    }
}

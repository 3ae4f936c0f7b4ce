//! Document representation and the text-to-tree reader
#![allow(clippy::must_use_candidate)] // Constructor/accessor API intentionally omits pervasive #[must_use].

use crate::node::XmlNode;
use crate::{Error, Result, XML_NS};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlDocument {
    /// Root element of the document
    pub root: XmlNode,

    /// Namespace declarations on the root element, keyed by prefix
    /// (the default namespace uses the empty prefix)
    pub namespaces: BTreeMap<String, String>,
}

impl XmlDocument {
    /// Create a document around an already-built root node
    pub fn new(root: XmlNode) -> Self {
        Self {
            root,
            namespaces: BTreeMap::new(),
        }
    }

    /// Root element
    pub fn root(&self) -> &XmlNode {
        &self.root
    }
}

/// Deepest element nesting [`parse_document`] accepts.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parse XML text into a labeled-node tree.
///
/// Comments, processing instructions and the document type declaration are
/// dropped; CDATA sections become text nodes. Elements nested deeper than
/// [`DEFAULT_MAX_DEPTH`] are rejected.
///
/// # Errors
///
/// Returns an error if the text is not well-formed XML, has no root element
/// or more than one, or nests elements too deeply.
pub fn parse_document(text: &str) -> Result<XmlDocument> {
    parse_document_with_depth(text, DEFAULT_MAX_DEPTH)
}

/// Like [`parse_document`], with an explicit element nesting limit.
///
/// # Errors
///
/// Returns a syntax error at the first start tag that would open element
/// number `max_depth + 1` on the path from the root.
pub fn parse_document_with_depth(text: &str, max_depth: usize) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(text);
    let mut builder = TreeBuilder::default();

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::syntax(text, offset(reader.error_position()), e.to_string())
        })?;
        let position = offset(reader.buffer_position());

        match event {
            Event::Start(ref e) => {
                builder
                    .check_depth(max_depth)
                    .map_err(|m| Error::syntax(text, position, m))?;
                let node = builder.open(e).map_err(|m| Error::syntax(text, position, m))?;
                builder.stack.push(node);
            }
            Event::Empty(ref e) => {
                builder
                    .check_depth(max_depth)
                    .map_err(|m| Error::syntax(text, position, m))?;
                let node = builder.open(e).map_err(|m| Error::syntax(text, position, m))?;
                builder.scopes.pop();
                builder.attach(node).map_err(|m| Error::syntax(text, position, m))?;
            }
            Event::End(_) => {
                builder.scopes.pop();
                if let Some(node) = builder.stack.pop() {
                    builder.attach(node).map_err(|m| Error::syntax(text, position, m))?;
                }
            }
            Event::Text(ref t) => {
                let value = t
                    .unescape()
                    .map_err(|e| Error::syntax(text, position, e.to_string()))?;
                builder.push_text(&value);
            }
            Event::CData(t) => {
                let value = String::from_utf8(t.into_inner().into_owned())
                    .map_err(|e| Error::Utf8(e.to_string()))?;
                builder.push_text(&value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = builder.stack.last() {
        return Err(Error::UnexpectedEof {
            open: open.name.clone(),
        });
    }

    let root = builder.root.ok_or(Error::NoRoot)?;
    trace!("Parsed XML document with root <{}>", root.name);

    Ok(XmlDocument {
        root,
        namespaces: builder.root_namespaces,
    })
}

fn offset(position: impl TryInto<usize>) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}

/// Incremental tree construction with namespace scoping
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<XmlNode>,
    scopes: Vec<BTreeMap<String, String>>,
    root: Option<XmlNode>,
    root_namespaces: BTreeMap<String, String>,
}

impl TreeBuilder {
    /// Build an element node from a start tag and push its namespace scope.
    fn open(&mut self, start: &BytesStart<'_>) -> std::result::Result<XmlNode, String> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| format!("invalid tag name: {e}"))?
            .to_string();
        let mut node = XmlNode::element(name);
        let mut declared = BTreeMap::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("attribute error: {e}"))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| format!("attribute key error: {e}"))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| format!("attribute value error: {e}"))?
                .into_owned();

            if key == "xmlns" {
                declared.insert(String::new(), value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.insert(prefix.to_string(), value);
            } else {
                node.attributes.insert(key, value);
            }
        }

        if self.stack.is_empty() && self.root.is_none() {
            self.root_namespaces.clone_from(&declared);
        }
        self.scopes.push(declared);

        let prefix = node.prefix.clone().unwrap_or_default();
        node.namespace = self.resolve(&prefix);
        if node.namespace.is_none() && !prefix.is_empty() {
            return Err(format!("undeclared namespace prefix '{prefix}'"));
        }

        Ok(node)
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NS.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .filter(|uri| !uri.is_empty())
            .cloned()
    }

    /// Refuse to open an element below `max_depth` ancestors.
    fn check_depth(&self, max_depth: usize) -> std::result::Result<(), String> {
        if self.stack.len() >= max_depth {
            return Err(format!("nesting too deep: more than {max_depth} levels"));
        }
        Ok(())
    }

    fn attach(&mut self, node: XmlNode) -> std::result::Result<(), String> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.add_child(node);
            }
            None if self.root.is_some() => {
                return Err(format!("multiple root elements: <{}> follows the root", node.name));
            }
            None => self.root = Some(node),
        }
        Ok(())
    }

    fn push_text(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            // Adjacent text and CDATA runs are kept as one node
            if let Some(last) = parent.children.last_mut() {
                if let Some(existing) = last.value.as_mut() {
                    existing.push_str(value);
                    return;
                }
            }
            parent.add_child(XmlNode::text(value));
        }
    }
}

//! Node types for the labeled XML tree
#![allow(clippy::must_use_candidate)] // Builder/accessor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::traversal::Descendants;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node in the XML tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNode {
    /// Node kind
    pub kind: NodeKind,

    /// Qualified tag name as written in the source (e.g. `xs:element`); empty for text
    pub name: String,

    /// Tag name without prefix
    pub local_name: String,

    /// Namespace prefix as written, if any
    pub prefix: Option<String>,

    /// Resolved namespace URI, if the element is in a namespace
    pub namespace: Option<String>,

    /// Attributes keyed by their qualified name (`xml:lang`, `name`, ...)
    pub attributes: BTreeMap<String, String>,

    /// Character data (text nodes only)
    pub value: Option<String>,

    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

/// Kinds of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Element with a tag name
    Element,

    /// Character data (text or CDATA)
    Text,
}

impl XmlNode {
    /// Create a new element node from a qualified tag name
    pub fn element(name: impl Into<String>) -> Self {
        let name = name.into();
        let (prefix, local_name) = split_qname(&name);
        Self {
            kind: NodeKind::Element,
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            name,
            namespace: None,
            attributes: BTreeMap::new(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Create a text node
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            name: String::new(),
            local_name: String::new(),
            prefix: None,
            namespace: None,
            attributes: BTreeMap::new(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Set the namespace URI
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add an attribute (builder form)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a child node (builder form)
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: XmlNode) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether this is an element node
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Whether this element has the given local name and is either in
    /// `namespace` or in no namespace at all.
    pub fn is_named(&self, local_name: &str, namespace: &str) -> bool {
        self.is_element()
            && self.local_name == local_name
            && self.namespace.as_deref().is_none_or(|ns| ns == namespace)
    }

    /// Get an attribute value by qualified name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Get a non-empty attribute value by qualified name
    pub fn non_empty_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key).filter(|v| !v.is_empty())
    }

    /// Iterate over element children, skipping text
    pub fn element_children(&self) -> impl DoubleEndedIterator<Item = &XmlNode> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// Find the first element child by local name
    pub fn find_child(&self, local_name: &str) -> Option<&XmlNode> {
        self.element_children().find(|c| c.local_name == local_name)
    }

    /// Find all element children by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&XmlNode> {
        self.element_children()
            .filter(|c| c.local_name == local_name)
            .collect()
    }

    /// Iterate over all descendant elements in document order (self excluded)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// Find the first descendant element by local name
    pub fn find_descendant(&self, local_name: &str) -> Option<&XmlNode> {
        self.descendants().find(|n| n.local_name == local_name)
    }

    /// Concatenated character data of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Text content trimmed, with whitespace runs collapsed to one space
    pub fn normalized_text(&self) -> String {
        normalize_whitespace(&self.text_content())
    }
}

fn collect_text(node: &XmlNode, out: &mut String) {
    if let Some(value) = &node.value {
        out.push_str(value);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

/// Split a qualified name into its optional prefix and local part
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Strip any `prefix:` from a name reference (`tei:p` becomes `p`)
pub fn strip_prefix(name: &str) -> &str {
    split_qname(name).1
}

/// Trim and collapse internal whitespace runs to a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_splits_prefix() {
        let node = XmlNode::element("xs:element");
        assert_eq!(node.name, "xs:element");
        assert_eq!(node.prefix.as_deref(), Some("xs"));
        assert_eq!(node.local_name, "element");
        assert!(node.is_element());
    }

    #[test]
    fn test_is_named_is_lenient_about_missing_namespace() {
        let bare = XmlNode::element("element");
        let qualified = XmlNode::element("xs:element").with_namespace("urn:xs");
        let foreign = XmlNode::element("element").with_namespace("urn:other");

        assert!(bare.is_named("element", "urn:xs"));
        assert!(qualified.is_named("element", "urn:xs"));
        assert!(!foreign.is_named("element", "urn:xs"));
        assert!(!XmlNode::text("element").is_named("element", "urn:xs"));
    }

    #[test]
    fn test_find_child_and_children() {
        let node = XmlNode::element("root")
            .with_child(XmlNode::element("a").with_attribute("n", "1"))
            .with_child(XmlNode::text("  "))
            .with_child(XmlNode::element("b"))
            .with_child(XmlNode::element("a").with_attribute("n", "2"));

        assert_eq!(node.find_child("a").unwrap().attribute("n"), Some("1"));
        assert_eq!(node.find_children("a").len(), 2);
        assert_eq!(node.element_children().count(), 3);
        assert!(node.find_child("c").is_none());
    }

    #[test]
    fn test_text_content_keeps_document_order() {
        let node = XmlNode::element("desc")
            .with_child(XmlNode::text("a "))
            .with_child(XmlNode::element("gi").with_child(XmlNode::text("b")))
            .with_child(XmlNode::text("\n   c "));

        assert_eq!(node.text_content(), "a b\n   c ");
        assert_eq!(node.normalized_text(), "a b c");
    }

    #[test]
    fn test_non_empty_attribute() {
        let node = XmlNode::element("e")
            .with_attribute("name", "")
            .with_attribute("ref", "x");
        assert_eq!(node.non_empty_attribute("name"), None);
        assert_eq!(node.non_empty_attribute("ref"), Some("x"));
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("tei:p"), "p");
        assert_eq!(strip_prefix("p"), "p");
    }
}

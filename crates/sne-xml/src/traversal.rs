//! Traversal APIs for navigating the XML tree

use crate::node::XmlNode;

/// Trait for visiting the element nodes of a tree
pub trait Traversal {
    /// Visit an element
    fn visit(&mut self, node: &XmlNode, path: &[String]);

    /// Called when entering an element with children
    fn enter(&mut self, _node: &XmlNode, _path: &[String]) {}

    /// Called when leaving an element with children
    fn leave(&mut self, _node: &XmlNode, _path: &[String]) {}

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

/// Walk the element tree using a visitor; `path` holds the local names of
/// the ancestors of the visited node.
pub fn walk<T: Traversal>(node: &XmlNode, visitor: &mut T) {
    walk_recursive(node, visitor, &mut vec![]);
}

fn walk_recursive<T: Traversal>(node: &XmlNode, visitor: &mut T, path: &mut Vec<String>) {
    if !visitor.should_continue() || !node.is_element() {
        return;
    }

    visitor.visit(node, path);

    if node.element_children().next().is_some() {
        visitor.enter(node, path);
        path.push(node.local_name.clone());

        for child in node.element_children() {
            walk_recursive(child, visitor, path);
        }

        path.pop();
        visitor.leave(node, path);
    }
}

/// Pre-order iterator over the descendant elements of a node
pub struct Descendants<'a> {
    stack: Vec<&'a XmlNode>,
}

impl<'a> Descendants<'a> {
    /// Start iterating below `node`
    pub fn new(node: &'a XmlNode) -> Self {
        let stack = node.element_children().rev().collect();
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.element_children().rev());
        Some(node)
    }
}

//! Pass 1: define collection and classification

use crate::{RNG_NS, documentation, pattern_name, rng_children};
use sne_xml::XmlNode;
use std::collections::HashMap;
use tracing::{debug, trace};

/// What a define declares, by naming convention and shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineKind {
    /// Wraps an `<element>` pattern
    Element,
    /// `model.*`: a set of alternative elements
    Model,
    /// `att.*`, `*.attributes`, `*.attribute`: shared attributes
    AttClass,
    /// `macro.*`: content inlined where referenced
    Macro,
    /// Anything else; inlined like a macro
    Other,
}

impl DefineKind {
    /// Classify a define from its name and whether any of its bodies
    /// contains an element pattern
    pub fn classify(name: &str, has_element: bool) -> Self {
        if name.starts_with("model.") {
            DefineKind::Model
        } else if name.starts_with("att.")
            || name.ends_with(".attributes")
            || name.ends_with(".attribute")
        {
            DefineKind::AttClass
        } else if name.starts_with("macro.") {
            DefineKind::Macro
        } else if has_element {
            DefineKind::Element
        } else {
            DefineKind::Other
        }
    }
}

/// A named define; several `combine` definitions of one name share an entry
#[derive(Debug, Clone)]
pub struct Define<'a> {
    pub name: String,
    pub kind: DefineKind,
    /// Every `<define>` node with this name, in document order
    pub bodies: Vec<&'a XmlNode>,
    /// First `<element>` pattern, for element defines
    pub element: Option<&'a XmlNode>,
}

impl<'a> Define<'a> {
    /// Name of the declared element: the pattern's name, else the define's
    pub fn element_name(&self) -> String {
        self.element
            .and_then(pattern_name)
            .unwrap_or_else(|| self.name.clone())
    }

    /// Documentation of the element pattern, else of the define itself
    pub fn documentation(&self) -> String {
        self.element
            .and_then(documentation)
            .filter(|d| !d.is_empty())
            .or_else(|| self.bodies.iter().find_map(|body| documentation(body)))
            .unwrap_or_default()
    }
}

/// All defines of a grammar, immutable after extraction
#[derive(Debug, Default)]
pub struct DefineTable<'a> {
    defines: HashMap<String, Define<'a>>,
    order: Vec<String>,
}

impl<'a> DefineTable<'a> {
    /// Collect every `<define>` in the document, wherever it is nested
    pub fn extract(root: &'a XmlNode) -> Self {
        let mut bodies: HashMap<&'a str, Vec<&'a XmlNode>> = HashMap::new();
        let mut order = Vec::new();

        for node in root.descendants().filter(|n| n.is_named("define", RNG_NS)) {
            let Some(name) = node.non_empty_attribute("name") else {
                debug!("Skipping define without a name");
                continue;
            };
            let entry = bodies.entry(name).or_default();
            if entry.is_empty() {
                order.push(name.to_string());
            }
            entry.push(node);
        }

        let defines = bodies
            .into_iter()
            .map(|(name, bodies)| {
                let element = bodies.iter().find_map(|body| first_element_pattern(body));
                let kind = DefineKind::classify(name, element.is_some());
                trace!("Define '{}' is {:?} ({} bodies)", name, kind, bodies.len());
                let define = Define {
                    name: name.to_string(),
                    kind,
                    bodies,
                    element,
                };
                (name.to_string(), define)
            })
            .collect();

        DefineTable { defines, order }
    }

    pub fn get(&self, name: &str) -> Option<&Define<'a>> {
        self.defines.get(name)
    }

    /// Defines in document order of their first definition
    pub fn iter(&self) -> impl Iterator<Item = &Define<'a>> {
        self.order.iter().filter_map(|name| self.defines.get(name))
    }

    /// Defines of one kind, in document order
    pub fn of_kind(&self, kind: DefineKind) -> impl Iterator<Item = &Define<'a>> {
        self.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }
}

pub(crate) fn first_element_pattern(body: &XmlNode) -> Option<&XmlNode> {
    body.descendants().find(|n| n.is_named("element", RNG_NS))
}

/// Pattern children that pass content through unchanged for class scanning
pub(crate) fn is_structural(node: &XmlNode) -> bool {
    matches!(
        node.local_name.as_str(),
        "choice" | "group" | "interleave" | "oneOrMore" | "zeroOrMore" | "optional" | "list" | "mixed"
    )
}

/// Walk structural patterns below `node`, calling `visit` for every `ref`
pub(crate) fn for_each_ref<'n>(node: &'n XmlNode, visit: &mut impl FnMut(&'n XmlNode)) {
    for child in rng_children(node) {
        if child.local_name == "ref" {
            visit(child);
        } else if is_structural(child) {
            for_each_ref(child, visit);
        }
    }
}

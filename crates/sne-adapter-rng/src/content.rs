//! Pass 2: content-model walking
//!
//! An element pattern is walked once, collecting every child occurrence with
//! the cardinality of its innermost wrapper. References are classified
//! through the [`DefineTable`]: element defines become children, model and
//! attribute classes are recorded for later expansion, and macros are
//! inlined under an [`ExpansionStack`] guard. Patterns and inlined macros
//! together nest at most `max_depth` levels.

use crate::defines::{DefineKind, DefineTable};
use crate::{RNG_NS, documentation, pattern_name, rng_children};
use sne_model::{Attribute, ChildRef, Compositor, ContentKind, ExpansionStack, MaxOccurs};
use sne_xml::XmlNode;
use tracing::{trace, warn};

/// Cardinality applied to patterns below a wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: MaxOccurs,
}

impl Occurs {
    pub const ONCE: Occurs = Occurs {
        min: 1,
        max: MaxOccurs::Bounded(1),
    };

    /// Cardinality introduced by a wrapper pattern, if it is one
    pub fn of_wrapper(local_name: &str) -> Option<Occurs> {
        match local_name {
            "optional" => Some(Occurs {
                min: 0,
                max: MaxOccurs::Bounded(1),
            }),
            "zeroOrMore" => Some(Occurs {
                min: 0,
                max: MaxOccurs::Unbounded,
            }),
            "oneOrMore" => Some(Occurs {
                min: 1,
                max: MaxOccurs::Unbounded,
            }),
            _ => None,
        }
    }
}

/// Everything found in one element's content
#[derive(Debug, Default)]
pub struct ContentModel {
    /// Child occurrences in document order, not yet merged
    pub occurrences: Vec<ChildRef>,
    pub attributes: Vec<Attribute>,
    pub model_refs: Vec<String>,
    pub attribute_class_refs: Vec<String>,
    pub content_kind: ContentKind,
}

/// Walk the content of an `<element>` pattern
pub fn collect_content(
    element: &XmlNode,
    table: &DefineTable<'_>,
    max_depth: usize,
) -> ContentModel {
    let mut walker = ContentWalker {
        table,
        max_depth,
        depth: 0,
        stack: ExpansionStack::new(),
        model: ContentModel::default(),
    };
    let kind = walker.walk(element, Occurs::ONCE);
    walker.model.content_kind = kind;
    walker.model
}

struct ContentWalker<'t, 'a> {
    table: &'t DefineTable<'a>,
    max_depth: usize,
    depth: usize,
    stack: ExpansionStack,
    model: ContentModel,
}

impl ContentWalker<'_, '_> {
    fn walk(&mut self, node: &XmlNode, occurs: Occurs) -> ContentKind {
        if self.depth >= self.max_depth {
            warn!(
                "Content of <{}> nested more than {} levels deep; skipped",
                node.name, self.max_depth
            );
            return ContentKind::Empty;
        }
        self.depth += 1;
        let kind = self.walk_children(node, occurs);
        self.depth -= 1;
        kind
    }

    fn walk_children(&mut self, node: &XmlNode, occurs: Occurs) -> ContentKind {
        let mut kind = ContentKind::Empty;

        for child in rng_children(node) {
            let found = match child.local_name.as_str() {
                "element" => {
                    if let Some(name) = pattern_name(child) {
                        self.push_child(name, occurs);
                    }
                    ContentKind::Element
                }
                "ref" => self.walk_ref(child, occurs),
                "attribute" => {
                    if let Some(attribute) = parse_attribute(child, occurs.min >= 1) {
                        self.model.attributes.push(attribute);
                    }
                    ContentKind::Empty
                }
                "optional" | "zeroOrMore" | "oneOrMore" => {
                    let inner = Occurs::of_wrapper(&child.local_name).unwrap_or(occurs);
                    self.walk(child, inner)
                }
                "choice" => {
                    let start = self.model.occurrences.len();
                    let inner = self.walk(child, occurs);
                    for occurrence in &mut self.model.occurrences[start..] {
                        occurrence.compositor = Compositor::Choice;
                    }
                    inner
                }
                "group" | "interleave" | "list" => self.walk(child, occurs),
                "mixed" => {
                    self.walk(child, occurs);
                    ContentKind::Mixed
                }
                "text" => ContentKind::Mixed,
                "data" | "value" => ContentKind::Text,
                _ => ContentKind::Empty,
            };
            kind = kind.merge(found);
        }

        kind
    }

    fn walk_ref(&mut self, node: &XmlNode, occurs: Occurs) -> ContentKind {
        let Some(name) = node.non_empty_attribute("name") else {
            return ContentKind::Empty;
        };
        let Some(define) = self.table.get(name) else {
            trace!("Dropping unresolved reference '{}'", name);
            return ContentKind::Empty;
        };

        match define.kind {
            DefineKind::Element => {
                self.push_child(define.element_name(), occurs);
                ContentKind::Element
            }
            DefineKind::Model => {
                self.model.model_refs.push(name.to_string());
                ContentKind::Element
            }
            DefineKind::AttClass => {
                self.model.attribute_class_refs.push(name.to_string());
                ContentKind::Empty
            }
            DefineKind::Macro | DefineKind::Other => {
                if !self.stack.enter(name) {
                    return ContentKind::Empty;
                }
                let mut kind = ContentKind::Empty;
                for body in &define.bodies {
                    kind = kind.merge(self.walk(body, occurs));
                }
                self.stack.leave();
                kind
            }
        }
    }

    fn push_child(&mut self, name: String, occurs: Occurs) {
        self.model
            .occurrences
            .push(ChildRef::new(name, occurs.min, occurs.max, Compositor::Sequence));
    }
}

/// Read an `<attribute>` pattern. Returns `None` for attributes without a
/// usable name (`anyName`, `nsName`).
pub fn parse_attribute(node: &XmlNode, required: bool) -> Option<Attribute> {
    let name = pattern_name(node)?;

    let values: Vec<String> = node
        .descendants()
        .filter(|n| n.is_named("value", RNG_NS))
        .map(XmlNode::normalized_text)
        .filter(|v| !v.is_empty())
        .collect();

    let mut attribute = Attribute::new(name)
        .with_documentation(documentation(node).unwrap_or_default())
        .with_required(required);
    if !values.is_empty() {
        attribute = attribute.with_values(values);
    }
    if let Some(data) = node.descendants().find(|n| n.is_named("data", RNG_NS)) {
        attribute = attribute.with_data_type(data.non_empty_attribute("type").unwrap_or("string"));
    }

    Some(attribute)
}

//! Reverse-index computation and final schema assembly
//!
//! Extractors collect one [`ElementDraft`] per element, then hand them to a
//! [`SchemaBuilder`]. `build` derives every element's parent list from the
//! forward child edges and sorts all name lists.

use crate::merge::{AttributeSet, ChildRefSet};
use crate::model::{Attribute, ChildRef, ContentKind, Element, Schema, SchemaFormat, SchematronRule};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, trace};

/// An element under construction
#[derive(Debug, Clone, Default)]
pub struct ElementDraft {
    pub name: String,
    pub documentation: String,
    pub child_refs: ChildRefSet,
    pub attributes: AttributeSet,
    pub content_kind: ContentKind,
    pub member_of: BTreeSet<String>,
    pub attribute_classes: BTreeSet<String>,
}

impl ElementDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Record an occurrence of a child, merging with earlier ones
    pub fn add_child(&mut self, child: ChildRef) {
        self.child_refs.insert(child);
    }

    /// Add an attribute unless one with that name is already present
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute);
    }

    pub fn merge_content_kind(&mut self, kind: ContentKind) {
        self.content_kind = std::mem::take(&mut self.content_kind).merge(kind);
    }
}

/// Assembles the final [`Schema`] from element drafts
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    format: SchemaFormat,
    drafts: BTreeMap<String, ElementDraft>,
    model_classes: BTreeMap<String, Vec<String>>,
    attribute_classes: BTreeMap<String, Vec<Attribute>>,
    rules: Vec<SchematronRule>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>, format: SchemaFormat) -> Self {
        Self {
            name: name.into(),
            format,
            drafts: BTreeMap::new(),
            model_classes: BTreeMap::new(),
            attribute_classes: BTreeMap::new(),
            rules: Vec::new(),
        }
    }

    /// The draft for `name`, created on first use
    pub fn element_mut(&mut self, name: &str) -> &mut ElementDraft {
        self.drafts
            .entry(name.to_string())
            .or_insert_with(|| ElementDraft::new(name))
    }

    /// Add a finished draft, replacing any earlier draft of the same name
    pub fn insert_element(&mut self, draft: ElementDraft) {
        self.drafts.insert(draft.name.clone(), draft);
    }

    pub fn contains_element(&self, name: &str) -> bool {
        self.drafts.contains_key(name)
    }

    /// Set a model class; members are deduplicated and sorted
    pub fn model_class(&mut self, name: impl Into<String>, members: impl IntoIterator<Item = String>) {
        let members: BTreeSet<String> = members.into_iter().collect();
        self.model_classes
            .insert(name.into(), members.into_iter().collect());
    }

    pub fn attribute_class(&mut self, name: impl Into<String>, attributes: Vec<Attribute>) {
        self.attribute_classes.insert(name.into(), attributes);
    }

    /// Append rules, keeping their order
    pub fn rules(&mut self, rules: impl IntoIterator<Item = SchematronRule>) {
        self.rules.extend(rules);
    }

    /// Compute parents and produce the immutable schema
    pub fn build(self) -> Schema {
        let parents = reverse_index(&self.drafts);

        let elements: BTreeMap<String, Element> = self
            .drafts
            .into_iter()
            .map(|(name, draft)| {
                let children: Vec<String> = draft.child_refs.names().map(str::to_string).collect();
                let element = Element {
                    parents: parents
                        .get(&name)
                        .map(|set| set.iter().cloned().collect())
                        .unwrap_or_default(),
                    children,
                    child_refs: draft.child_refs.into_sorted(),
                    attributes: draft.attributes.into_sorted(),
                    content_kind: draft.content_kind,
                    member_of: draft.member_of.into_iter().collect(),
                    attribute_classes: draft.attribute_classes.into_iter().collect(),
                    documentation: draft.documentation,
                    name: draft.name,
                };
                (name, element)
            })
            .collect();

        let element_names = elements.keys().cloned().collect();
        let schema = Schema {
            name: self.name,
            format: self.format,
            elements,
            model_classes: self.model_classes,
            attribute_classes: self.attribute_classes,
            element_names,
            schematron_rules: self.rules,
        };

        info!(
            "Built {} schema '{}' with {} elements",
            schema.format.display_name(),
            schema.name,
            schema.elements.len()
        );
        schema
    }
}

/// child name → sorted set of parent names
fn reverse_index(drafts: &BTreeMap<String, ElementDraft>) -> BTreeMap<String, BTreeSet<String>> {
    let mut parents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (parent, draft) in drafts {
        for child in draft.child_refs.names() {
            parents
                .entry(child.to_string())
                .or_default()
                .insert(parent.clone());
        }
    }
    trace!("Computed parent index for {} children", parents.len());
    parents
}

//! Pass 1 lookup tables
//!
//! The context is built once from the document's top-level declarations and
//! only read afterwards.

use crate::{XS_NS, documentation, xs_child, xs_children};
use sne_model::{Attribute, Member, flatten};
use sne_xml::{XmlDocument, XmlNode, split_qname, strip_prefix};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Named top-level declarations of an XSD document
#[derive(Debug, Default)]
pub struct XsdContext<'a> {
    complex_types: HashMap<String, &'a XmlNode>,
    simple_types: HashSet<String>,
    groups: HashMap<String, Vec<Member<String>>>,
    attribute_groups: HashMap<String, Vec<Member<Attribute>>>,
    group_order: Vec<String>,
    attribute_group_order: Vec<String>,
    /// Prefixes bound to the XSD namespace on the root (`""` for a default binding)
    xs_prefixes: HashSet<String>,
}

impl<'a> XsdContext<'a> {
    /// Collect the top-level complex types, simple types, groups and
    /// attribute groups of `document`
    pub fn extract(document: &'a XmlDocument) -> Self {
        let mut context = XsdContext {
            xs_prefixes: document
                .namespaces
                .iter()
                .filter(|(_, uri)| uri.as_str() == XS_NS)
                .map(|(prefix, _)| prefix.clone())
                .collect(),
            ..XsdContext::default()
        };

        for node in xs_children(&document.root) {
            let Some(name) = node.non_empty_attribute("name") else {
                if matches!(
                    node.local_name.as_str(),
                    "complexType" | "simpleType" | "group" | "attributeGroup"
                ) {
                    debug!("Skipping unnamed top-level <{}>", node.name);
                }
                continue;
            };

            match node.local_name.as_str() {
                "complexType" => {
                    context.complex_types.insert(name.to_string(), node);
                }
                "simpleType" => {
                    context.simple_types.insert(name.to_string());
                }
                "group" => {
                    let mut members = Vec::new();
                    let mut sub_groups = Vec::new();
                    collect_group_members(node, &mut members, &mut sub_groups);
                    members.extend(sub_groups);
                    if context.groups.insert(name.to_string(), members).is_none() {
                        context.group_order.push(name.to_string());
                    }
                }
                "attributeGroup" => {
                    let members = collect_attribute_group_members(node, name);
                    if context
                        .attribute_groups
                        .insert(name.to_string(), members)
                        .is_none()
                    {
                        context.attribute_group_order.push(name.to_string());
                    }
                }
                _ => {}
            }
        }

        context
    }

    /// Named complex type, with any prefix on `name` ignored
    pub fn complex_type(&self, name: &str) -> Option<&'a XmlNode> {
        self.complex_types.get(strip_prefix(name)).copied()
    }

    /// Whether a `type` reference names a declared simple type or an XSD built-in
    pub fn is_simple_type(&self, type_ref: &str) -> bool {
        let (prefix, local) = split_qname(type_ref);
        self.simple_types.contains(local) || self.xs_prefixes.contains(prefix.unwrap_or_default())
    }

    /// Flattened member elements of a group, duplicates removed, document order
    pub fn group_members(&self, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        flatten(name, |g| self.groups.get(g).map(Vec::as_slice))
            .into_iter()
            .filter(|member| seen.insert(member.clone()))
            .collect()
    }

    /// Flattened attributes of an attribute group: own attributes first, then
    /// those of referenced groups
    pub fn attribute_group_attributes(&self, name: &str) -> Vec<Attribute> {
        flatten(name, |g| self.attribute_groups.get(g).map(Vec::as_slice))
    }

    /// Whether an attribute group of this name is declared
    pub fn has_attribute_group(&self, name: &str) -> bool {
        self.attribute_groups.contains_key(name)
    }

    /// Group names in document order
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.group_order.iter().map(String::as_str)
    }

    /// Attribute group names in document order
    pub fn attribute_group_names(&self) -> impl Iterator<Item = &str> {
        self.attribute_group_order.iter().map(String::as_str)
    }

    pub fn complex_type_count(&self) -> usize {
        self.complex_types.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn attribute_group_count(&self) -> usize {
        self.attribute_groups.len()
    }
}

/// Walk a group's compositors collecting member elements and group references
fn collect_group_members(
    node: &XmlNode,
    members: &mut Vec<Member<String>>,
    sub_groups: &mut Vec<Member<String>>,
) {
    for child in xs_children(node) {
        match child.local_name.as_str() {
            "element" => {
                if let Some(name) = child
                    .non_empty_attribute("name")
                    .or_else(|| child.non_empty_attribute("ref"))
                {
                    members.push(Member::Item(strip_prefix(name).to_string()));
                }
            }
            "group" => {
                if let Some(reference) = child.non_empty_attribute("ref") {
                    sub_groups.push(Member::Ref(strip_prefix(reference).to_string()));
                }
            }
            "sequence" | "choice" | "all" => collect_group_members(child, members, sub_groups),
            _ => {}
        }
    }
}

/// Own attributes first, then attribute-group references
fn collect_attribute_group_members(node: &XmlNode, group: &str) -> Vec<Member<Attribute>> {
    let mut attributes = Vec::new();
    let mut references = Vec::new();
    for child in xs_children(node) {
        match child.local_name.as_str() {
            "attribute" => {
                if let Some(attribute) = parse_attribute(child) {
                    attributes.push(Member::Item(attribute.with_from_class(group)));
                }
            }
            "attributeGroup" => {
                if let Some(reference) = child.non_empty_attribute("ref") {
                    references.push(Member::Ref(strip_prefix(reference).to_string()));
                }
            }
            _ => {}
        }
    }
    attributes.extend(references);
    attributes
}

/// Read an `attribute` declaration or reference. Returns `None` when it has
/// neither a name nor a ref.
pub fn parse_attribute(node: &XmlNode) -> Option<Attribute> {
    let name = node
        .non_empty_attribute("name")
        .or_else(|| node.non_empty_attribute("ref"))?;

    let mut attribute = Attribute::new(strip_prefix(name))
        .with_documentation(documentation(node))
        .with_required(node.attribute("use") == Some("required"));

    if let Some(type_ref) = node.non_empty_attribute("type") {
        attribute = attribute.with_data_type(strip_prefix(type_ref));
    } else if let Some(restriction) =
        xs_child(node, "simpleType").and_then(|st| xs_child(st, "restriction"))
    {
        let values: Vec<String> = xs_children(restriction)
            .filter(|facet| facet.local_name == "enumeration")
            .filter_map(|facet| facet.attribute("value"))
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            if let Some(base) = restriction.non_empty_attribute("base") {
                attribute = attribute.with_data_type(strip_prefix(base));
            }
        } else {
            attribute = attribute.with_values(values);
        }
    }

    Some(attribute)
}

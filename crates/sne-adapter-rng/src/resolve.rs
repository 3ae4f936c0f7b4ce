//! Passes 3-4: class flattening, expansion and assembly

use crate::content::{Occurs, collect_content, parse_attribute};
use crate::defines::{Define, DefineKind, DefineTable, for_each_ref};
use crate::rng_children;
use sne_model::{
    Attribute, AttributeSet, ChildRef, ContentKind, ExpansionStack, Member, Schema, SchemaBuilder,
    SchemaFormat, flatten,
};
use sne_xml::XmlNode;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// Flatten classes, expand them into elements and build the schema.
/// Pattern walks give up below `max_depth` levels of nesting.
pub fn assemble(name: &str, table: &DefineTable<'_>, max_depth: usize) -> Schema {
    let mut builder = SchemaBuilder::new(name, SchemaFormat::Rng);

    let model_classes = model_classes(table);
    let attribute_classes = attribute_classes(table, max_depth);
    debug!(
        "RelaxNG '{}': {} defines, {} model classes, {} attribute classes",
        name,
        table.len(),
        model_classes.len(),
        attribute_classes.len()
    );

    for define in table.of_kind(DefineKind::Element) {
        let Some(pattern) = define.element else {
            continue;
        };
        let content = collect_content(pattern, table, max_depth);
        let draft = builder.element_mut(&define.element_name());

        if draft.documentation.is_empty() {
            draft.documentation = define.documentation();
        }
        for occurrence in content.occurrences {
            draft.add_child(occurrence);
        }
        for class in &content.model_refs {
            for member in model_classes.get(class).into_iter().flatten() {
                draft.add_child(ChildRef::class_member(member.clone()));
            }
        }

        for attribute in content.attributes {
            draft.add_attribute(attribute);
        }
        for class in content.attribute_class_refs {
            for attribute in attribute_classes.get(&class).into_iter().flatten() {
                draft.add_attribute(attribute.clone());
            }
            draft.attribute_classes.insert(class);
        }

        draft.merge_content_kind(content.content_kind);
        if !draft.child_refs.is_empty() && draft.content_kind == ContentKind::Empty {
            draft.content_kind = ContentKind::Element;
        }
    }

    for (class, members) in &model_classes {
        for member in members {
            if builder.contains_element(member) {
                builder.element_mut(member).member_of.insert(class.clone());
            }
        }
        builder.model_class(class.clone(), members.iter().cloned());
    }
    for (class, attributes) in attribute_classes {
        builder.attribute_class(class, attributes);
    }

    builder.build()
}

/// Flattened, non-empty model classes with sorted members
fn model_classes(table: &DefineTable<'_>) -> BTreeMap<String, Vec<String>> {
    let members: HashMap<&str, Vec<Member<String>>> = table
        .of_kind(DefineKind::Model)
        .map(|define| (define.name.as_str(), model_members(define, table)))
        .collect();

    table
        .of_kind(DefineKind::Model)
        .filter_map(|define| {
            let flat: BTreeSet<String> = flatten(&define.name, |class| {
                members.get(class).map(Vec::as_slice)
            })
            .into_iter()
            .collect();
            if flat.is_empty() {
                trace!("Model class '{}' has no members", define.name);
                return None;
            }
            Some((define.name.clone(), flat.into_iter().collect()))
        })
        .collect()
}

/// References of a model class: element defines are members, model defines
/// are sub-classes, anything else is ignored
fn model_members(define: &Define<'_>, table: &DefineTable<'_>) -> Vec<Member<String>> {
    let mut members = Vec::new();
    for body in &define.bodies {
        for_each_ref(body, &mut |reference: &XmlNode| {
            let Some(target) = reference
                .non_empty_attribute("name")
                .and_then(|name| table.get(name))
            else {
                return;
            };
            match target.kind {
                DefineKind::Element => members.push(Member::Item(target.element_name())),
                DefineKind::Model => members.push(Member::Ref(target.name.clone())),
                _ => {}
            }
        });
    }
    members
}

/// Flattened, non-empty attribute classes. Attributes keep the attribute
/// class that declares them; the first declaration of a name wins.
fn attribute_classes(
    table: &DefineTable<'_>,
    max_depth: usize,
) -> BTreeMap<String, Vec<Attribute>> {
    let members: HashMap<&str, Vec<Member<Attribute>>> = table
        .of_kind(DefineKind::AttClass)
        .map(|define| (define.name.as_str(), attribute_members(define, table, max_depth)))
        .collect();

    table
        .of_kind(DefineKind::AttClass)
        .filter_map(|define| {
            let attributes: AttributeSet =
                flatten(&define.name, |class| members.get(class).map(Vec::as_slice))
                    .into_iter()
                    .collect();
            (!attributes.is_empty()).then(|| (define.name.clone(), attributes.into_sorted()))
        })
        .collect()
}

/// Own attributes first, then references to other attribute classes.
/// Plain defines are inlined, so their attributes belong to `define`.
fn attribute_members(
    define: &Define<'_>,
    table: &DefineTable<'_>,
    max_depth: usize,
) -> Vec<Member<Attribute>> {
    let mut collector = AttributeMembers {
        owner: define.name.as_str(),
        table,
        max_depth,
        depth: 0,
        stack: ExpansionStack::new(),
        attributes: Vec::new(),
        references: Vec::new(),
    };
    collector.stack.enter(&define.name);
    for body in &define.bodies {
        collector.collect(body, Occurs::ONCE);
    }
    collector.attributes.extend(collector.references);
    collector.attributes
}

struct AttributeMembers<'t, 'a> {
    owner: &'t str,
    table: &'t DefineTable<'a>,
    max_depth: usize,
    depth: usize,
    stack: ExpansionStack,
    attributes: Vec<Member<Attribute>>,
    references: Vec<Member<Attribute>>,
}

impl AttributeMembers<'_, '_> {
    fn collect(&mut self, node: &XmlNode, occurs: Occurs) {
        if self.depth >= self.max_depth {
            warn!(
                "Attributes of '{}' nested more than {} levels deep; skipped",
                self.owner, self.max_depth
            );
            return;
        }
        self.depth += 1;
        self.collect_children(node, occurs);
        self.depth -= 1;
    }

    fn collect_children(&mut self, node: &XmlNode, occurs: Occurs) {
        for child in rng_children(node) {
            match child.local_name.as_str() {
                "attribute" => {
                    if let Some(attribute) = parse_attribute(child, occurs.min >= 1) {
                        self.attributes
                            .push(Member::Item(attribute.with_from_class(self.owner)));
                    }
                }
                "ref" => {
                    let Some(target) = child
                        .non_empty_attribute("name")
                        .and_then(|name| self.table.get(name))
                    else {
                        continue;
                    };
                    match target.kind {
                        DefineKind::AttClass => {
                            self.references.push(Member::Ref(target.name.clone()));
                        }
                        DefineKind::Other => self.inline(target, occurs),
                        _ => {}
                    }
                }
                "optional" | "zeroOrMore" | "oneOrMore" => {
                    let inner = Occurs::of_wrapper(&child.local_name).unwrap_or(occurs);
                    self.collect(child, inner);
                }
                "choice" | "group" | "interleave" => self.collect(child, occurs),
                _ => {}
            }
        }
    }

    fn inline(&mut self, target: &Define<'_>, occurs: Occurs) {
        if !self.stack.enter(&target.name) {
            return;
        }
        trace!("Inlining '{}' into attribute class '{}'", target.name, self.owner);
        for body in &target.bodies {
            self.collect(body, occurs);
        }
        self.stack.leave();
    }
}

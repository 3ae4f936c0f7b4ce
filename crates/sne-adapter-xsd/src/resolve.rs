//! Passes 2-4: reference expansion, parent index and assembly

use crate::content::RawElement;
use crate::context::XsdContext;
use sne_model::{
    AttributeSet, ChildRef, ContentKind, ElementDraft, Schema, SchemaBuilder, SchemaFormat,
};
use std::collections::BTreeMap;
use tracing::trace;

/// Expand group and attribute-group references and build the schema
pub fn assemble(name: &str, raw: Vec<RawElement>, context: &XsdContext<'_>) -> Schema {
    let mut builder = SchemaBuilder::new(name, SchemaFormat::Xsd);

    let group_members: BTreeMap<String, Vec<String>> = context
        .group_names()
        .map(|group| (group.to_string(), context.group_members(group)))
        .collect();

    for element in raw {
        builder.insert_element(resolve_element(element, context, &group_members));
    }

    for (group, members) in &group_members {
        for member in members {
            if builder.contains_element(member) {
                builder.element_mut(member).member_of.insert(group.clone());
            }
        }
        builder.model_class(group.clone(), members.iter().cloned());
    }

    for group in context.attribute_group_names() {
        let attributes: AttributeSet = context.attribute_group_attributes(group).into_iter().collect();
        builder.attribute_class(group, attributes.into_sorted());
    }

    builder.build()
}

fn resolve_element(
    raw: RawElement,
    context: &XsdContext<'_>,
    group_members: &BTreeMap<String, Vec<String>>,
) -> ElementDraft {
    let mut draft = ElementDraft::new(raw.name);
    draft.documentation = raw.documentation;
    draft.content_kind = raw.content_kind;

    for child in raw.child_refs {
        draft.add_child(child);
    }

    // Expanded members take the referencing occurrence's cardinality
    for group in &raw.group_refs {
        let Some(members) = group_members.get(&group.name) else {
            trace!("Dropping unresolved group reference '{}'", group.name);
            continue;
        };
        for member in members {
            draft.add_child(ChildRef::new(
                member.clone(),
                group.min_occurs,
                group.max_occurs,
                group.compositor,
            ));
        }
    }

    for attribute in raw.attributes {
        draft.add_attribute(attribute);
    }
    for group in &raw.attribute_group_refs {
        if !context.has_attribute_group(group) {
            trace!("Dropping unresolved attribute group '{}' on '{}'", group, draft.name);
            continue;
        }
        for attribute in context.attribute_group_attributes(group) {
            draft.add_attribute(attribute);
        }
        draft.attribute_classes.insert(group.clone());
    }

    if !draft.child_refs.is_empty() && draft.content_kind == ContentKind::Empty {
        draft.content_kind = ContentKind::Element;
    }

    draft
}

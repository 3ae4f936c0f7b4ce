//! `elementSpec` and `classSpec` projection

use crate::language::{documentation, select};
use crate::{TEI_NS, is_deleted};
use sne_model::{
    Attribute, AttributeSet, ContentKind, ElementDraft, Member, Schema, SchemaBuilder,
    SchemaFormat, flatten,
};
use sne_xml::XmlNode;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Kind of a `classSpec`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassType {
    Model,
    Atts,
}

impl ClassType {
    fn from_attribute(value: Option<&str>) -> Option<Self> {
        match value {
            Some("model") => Some(ClassType::Model),
            Some("atts") => Some(ClassType::Atts),
            _ => None,
        }
    }
}

/// Project every live spec under `schema_spec` into a schema
pub fn extract(name: &str, schema_spec: &XmlNode, language: &str) -> Schema {
    let mut builder = SchemaBuilder::new(name, SchemaFormat::Odd);
    // element or class name -> declared memberships
    let mut memberships: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for spec in live_specs(schema_spec, "elementSpec") {
        let Some(ident) = spec.non_empty_attribute("ident") else {
            debug!("Skipping elementSpec without ident");
            continue;
        };
        let classes = member_of(spec);
        builder.insert_element(element_draft(ident, spec, &classes, language));
        memberships.insert(ident.to_string(), classes);
    }

    let mut model_subclasses: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut model_names = Vec::new();

    for spec in live_specs(schema_spec, "classSpec") {
        let Some(ident) = spec.non_empty_attribute("ident") else {
            debug!("Skipping classSpec without ident");
            continue;
        };
        match ClassType::from_attribute(spec.attribute("type")) {
            Some(ClassType::Model) => {
                model_names.push(ident.to_string());
                for parent in member_of(spec) {
                    model_subclasses.entry(parent).or_default().push(ident.to_string());
                }
            }
            Some(ClassType::Atts) => {
                let attributes: AttributeSet = att_defs(spec, Some(ident), language).collect();
                if attributes.is_empty() {
                    trace!("Attribute class '{}' declares no attributes", ident);
                } else {
                    builder.attribute_class(ident, attributes.into_sorted());
                }
            }
            None => trace!("Ignoring classSpec '{}' of unknown type", ident),
        }
    }

    // Elements that declared membership, then sub-classes that did
    let class_members: BTreeMap<&str, Vec<Member<String>>> = model_names
        .iter()
        .map(|class| {
            let elements = memberships
                .iter()
                .filter(|(_, classes)| classes.contains(class))
                .map(|(element, _)| Member::Item(element.clone()));
            let subclasses = model_subclasses
                .get(class)
                .into_iter()
                .flatten()
                .map(|sub| Member::Ref(sub.clone()));
            (class.as_str(), elements.chain(subclasses).collect())
        })
        .collect();

    for class in &model_names {
        let members = flatten(class, |c| class_members.get(c).map(Vec::as_slice));
        builder.model_class(class.clone(), members);
    }

    builder.build()
}

/// Descendant specs of one kind that are not deleted
fn live_specs<'a>(
    schema_spec: &'a XmlNode,
    local_name: &'a str,
) -> impl Iterator<Item = &'a XmlNode> + 'a {
    schema_spec
        .descendants()
        .filter(move |n| n.is_named(local_name, TEI_NS))
        .filter(|spec| {
            let deleted = is_deleted(spec);
            if deleted {
                debug!(
                    "Skipping deleted {} '{}'",
                    spec.local_name,
                    spec.attribute("ident").unwrap_or_default()
                );
            }
            !deleted
        })
}

fn element_draft(ident: &str, spec: &XmlNode, classes: &[String], language: &str) -> ElementDraft {
    let mut draft = ElementDraft::new(ident);
    draft.documentation = documentation(spec, language);
    draft.content_kind = match spec.non_empty_attribute("module") {
        Some(module) => ContentKind::Module(module.to_string()),
        None => ContentKind::Unknown,
    };
    draft.attributes = att_defs(spec, None, language).collect();

    let (models, atts): (BTreeSet<&String>, BTreeSet<&String>) = classes
        .iter()
        .filter(|c| c.starts_with("model.") || c.starts_with("att."))
        .partition(|c| c.starts_with("model."));
    draft.member_of = models.into_iter().cloned().collect();
    draft.attribute_classes = atts.into_iter().cloned().collect();
    draft
}

/// Class keys from `classes/memberOf`, in document order
fn member_of(spec: &XmlNode) -> Vec<String> {
    spec.find_child("classes")
        .map(|classes| {
            classes
                .find_children("memberOf")
                .into_iter()
                .filter(|m| !is_deleted(m))
                .filter_map(|m| m.non_empty_attribute("key"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Live `attDef`s of every `attList` below `spec`
fn att_defs<'a>(
    spec: &'a XmlNode,
    from_class: Option<&'a str>,
    language: &'a str,
) -> impl Iterator<Item = Attribute> + 'a {
    spec.descendants()
        .filter(|n| n.is_named("attList", TEI_NS))
        .flat_map(|list| list.element_children())
        .filter(|n| n.is_named("attDef", TEI_NS) && !is_deleted(n))
        .filter_map(move |def| {
            let attribute = parse_att_def(def, language)?;
            Some(match from_class {
                Some(class) => attribute.with_from_class(class),
                None => attribute,
            })
        })
}

/// Read one `attDef`; `None` when it has no `ident`
pub fn parse_att_def(def: &XmlNode, language: &str) -> Option<Attribute> {
    let ident = def.non_empty_attribute("ident")?;

    let values: Vec<String> = def
        .find_descendant("valList")
        .map(|list| {
            list.descendants()
                .filter(|n| n.local_name == "valItem")
                .filter_map(|item| item.non_empty_attribute("ident"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut attribute = Attribute::new(ident)
        .with_documentation(select(def, "desc", language).unwrap_or_default())
        .with_required(def.attribute("usage") == Some("req"));

    if values.is_empty() {
        if let Some(data_ref) = def.find_descendant("dataRef") {
            let data_type = data_ref
                .non_empty_attribute("name")
                .or_else(|| data_ref.non_empty_attribute("key"))
                .unwrap_or("string");
            attribute = attribute.with_data_type(data_type);
        }
    } else {
        attribute = attribute.with_values(values);
    }

    Some(attribute)
}

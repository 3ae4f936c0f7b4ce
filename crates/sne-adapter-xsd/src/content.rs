//! Pass 1: content-model walking of top-level elements

use crate::context::{XsdContext, parse_attribute};
use crate::{documentation, xs_child, xs_children};
use sne_model::{Attribute, ChildRef, Compositor, ContentKind, MaxOccurs};
use sne_xml::{XmlNode, strip_prefix};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// A group reference, deferred until pass 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub name: String,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub compositor: Compositor,
}

/// An element as found in the document, references still unexpanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub name: String,
    pub documentation: String,
    pub content_kind: ContentKind,
    pub child_refs: Vec<ChildRef>,
    pub group_refs: Vec<GroupRef>,
    pub attributes: Vec<Attribute>,
    pub attribute_group_refs: Vec<String>,
}

/// Extract every named top-level element of the schema root. Type
/// derivation is followed at most `max_depth` base types deep.
pub fn extract_elements(
    root: &XmlNode,
    context: &XsdContext<'_>,
    max_depth: usize,
) -> Vec<RawElement> {
    xs_children(root)
        .filter(|node| node.local_name == "element")
        .filter_map(|node| {
            let element = extract_element(node, context, max_depth);
            if element.is_none() {
                debug!("Skipping top-level element without a name");
            }
            element
        })
        .collect()
}

fn extract_element(
    node: &XmlNode,
    context: &XsdContext<'_>,
    max_depth: usize,
) -> Option<RawElement> {
    let name = node.non_empty_attribute("name")?;
    let type_ref = node.non_empty_attribute("type");

    let mut collector = ContentCollector::new(context, max_depth);
    let complex_type = match xs_child(node, "complexType") {
        Some(inline) => Some(inline),
        None => type_ref.and_then(|t| {
            collector.visited_types.insert(strip_prefix(t).to_string());
            context.complex_type(t)
        }),
    };

    let mut content_kind = ContentKind::Empty;
    let mut type_documentation = String::new();
    match complex_type {
        Some(ct) => {
            content_kind = collector.walk_complex_type(ct);
            type_documentation = documentation(ct);
        }
        None => {
            let simple = xs_child(node, "simpleType").is_some()
                || type_ref.is_some_and(|t| context.is_simple_type(t));
            if simple {
                content_kind = ContentKind::Text;
            } else if let Some(t) = type_ref {
                debug!("Element '{}' has unresolved type '{}'", name, t);
            }
        }
    }

    let own_documentation = documentation(node);
    trace!(
        "Element '{}': {} child refs, {} group refs",
        name,
        collector.child_refs.len(),
        collector.group_refs.len()
    );

    Some(RawElement {
        name: name.to_string(),
        documentation: if own_documentation.is_empty() {
            type_documentation
        } else {
            own_documentation
        },
        content_kind,
        child_refs: collector.child_refs,
        group_refs: collector.group_refs,
        attributes: collector.attributes,
        attribute_group_refs: collector.attribute_group_refs,
    })
}

/// Accumulates one element's content model while walking its type
struct ContentCollector<'c, 'a> {
    context: &'c XsdContext<'a>,
    max_depth: usize,
    visited_types: HashSet<String>,
    child_refs: Vec<ChildRef>,
    group_refs: Vec<GroupRef>,
    attributes: Vec<Attribute>,
    attribute_group_refs: Vec<String>,
}

impl<'c, 'a> ContentCollector<'c, 'a> {
    fn new(context: &'c XsdContext<'a>, max_depth: usize) -> Self {
        Self {
            context,
            max_depth,
            visited_types: HashSet::new(),
            child_refs: Vec::new(),
            group_refs: Vec::new(),
            attributes: Vec::new(),
            attribute_group_refs: Vec::new(),
        }
    }

    /// Walk a complex type (or a derivation node) and return its content kind
    fn walk_complex_type(&mut self, ct: &XmlNode) -> ContentKind {
        let mut kind = if ct.attribute("mixed") == Some("true") {
            ContentKind::Mixed
        } else {
            ContentKind::Empty
        };

        for child in xs_children(ct) {
            let local = child.local_name.as_str();
            if let Some(compositor) = Compositor::from_local_name(local) {
                kind = kind.merge(ContentKind::Element);
                self.walk_compositor(child, compositor);
                continue;
            }

            match local {
                "group" => {
                    if let Some(group) = group_ref(child, Compositor::Sequence) {
                        self.group_refs.push(group);
                    }
                }
                "simpleContent" | "complexContent" => {
                    kind = kind.merge(self.walk_derivation(child));
                }
                "attribute" => {
                    if let Some(attribute) = parse_attribute(child) {
                        self.attributes.push(attribute);
                    }
                }
                "attributeGroup" => {
                    if let Some(reference) = child.non_empty_attribute("ref") {
                        self.attribute_group_refs
                            .push(strip_prefix(reference).to_string());
                    }
                }
                _ => {}
            }
        }

        kind
    }

    /// `simpleContent`/`complexContent`: walk the named base type, then the
    /// extension or restriction itself
    fn walk_derivation(&mut self, content: &XmlNode) -> ContentKind {
        let Some(derivation) =
            xs_child(content, "extension").or_else(|| xs_child(content, "restriction"))
        else {
            return ContentKind::Empty;
        };

        let mut kind = if content.local_name == "simpleContent" {
            ContentKind::Text
        } else {
            ContentKind::Empty
        };

        if let Some(base) = derivation.non_empty_attribute("base") {
            let base_name = strip_prefix(base);
            match self.context.complex_type(base_name) {
                Some(_) if self.visited_types.len() >= self.max_depth => {
                    warn!(
                        "Not following base type '{}': more than {} derivations deep",
                        base_name, self.max_depth
                    );
                }
                Some(base_type) if self.visited_types.insert(base_name.to_string()) => {
                    kind = kind.merge(self.walk_complex_type(base_type));
                }
                Some(_) => debug!("Cyclic derivation from base type '{}'", base_name),
                None => {}
            }
        }

        kind.merge(self.walk_complex_type(derivation))
    }

    fn walk_compositor(&mut self, node: &XmlNode, compositor: Compositor) {
        for child in xs_children(node) {
            let local = child.local_name.as_str();
            if let Some(nested) = Compositor::from_local_name(local) {
                self.walk_compositor(child, nested);
                continue;
            }

            match local {
                "element" => {
                    let Some(name) = child
                        .non_empty_attribute("name")
                        .or_else(|| child.non_empty_attribute("ref"))
                    else {
                        continue;
                    };
                    let (min_occurs, max_occurs) = occurs(child);
                    self.child_refs.push(ChildRef::new(
                        strip_prefix(name),
                        min_occurs,
                        max_occurs,
                        compositor,
                    ));
                }
                "group" => {
                    if let Some(group) = group_ref(child, compositor) {
                        self.group_refs.push(group);
                    }
                }
                _ => {}
            }
        }
    }
}

fn group_ref(node: &XmlNode, compositor: Compositor) -> Option<GroupRef> {
    let reference = node.non_empty_attribute("ref")?;
    let (min_occurs, max_occurs) = occurs(node);
    Some(GroupRef {
        name: strip_prefix(reference).to_string(),
        min_occurs,
        max_occurs,
        compositor,
    })
}

/// `minOccurs`/`maxOccurs` with the XSD default of 1; unparsable values
/// fall back to the default
pub fn occurs(node: &XmlNode) -> (u32, MaxOccurs) {
    let min_occurs = node
        .attribute("minOccurs")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1);
    let max_occurs = match node.attribute("maxOccurs").map(str::trim) {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(v) => v.parse().map(MaxOccurs::Bounded).unwrap_or_default(),
        None => MaxOccurs::default(),
    };
    (min_occurs, max_occurs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XS_NS;
    use sne_xml::parse_document;

    fn wrap(body: &str) -> String {
        format!(r#"<xs:schema xmlns:xs="{XS_NS}">{body}</xs:schema>"#)
    }

    fn extract(body: &str) -> Vec<RawElement> {
        let doc = parse_document(&wrap(body)).unwrap();
        let context = XsdContext::extract(&doc);
        extract_elements(&doc.root, &context, 512)
    }

    #[test]
    fn test_occurs_defaults_and_fallbacks() {
        let doc = parse_document(
            r#"<r><e/><e minOccurs="0" maxOccurs="unbounded"/><e minOccurs="unbounded" maxOccurs="x"/><e maxOccurs=" 3 "/></r>"#,
        )
        .unwrap();
        let parsed: Vec<_> = doc.root.element_children().map(occurs).collect();
        assert_eq!(
            parsed,
            vec![
                (1, MaxOccurs::Bounded(1)),
                (0, MaxOccurs::Unbounded),
                (1, MaxOccurs::Bounded(1)),
                (1, MaxOccurs::Bounded(3)),
            ]
        );
    }

    #[test]
    fn test_inline_choice_children_carry_compositor() {
        let elements = extract(
            r#"<xs:element name="p"><xs:complexType><xs:choice>
                 <xs:element ref="note" minOccurs="0" maxOccurs="unbounded"/>
                 <xs:element ref="quote"/>
               </xs:choice></xs:complexType></xs:element>"#,
        );
        let p = &elements[0];

        assert_eq!(p.content_kind, ContentKind::Element);
        assert_eq!(
            p.child_refs,
            vec![
                ChildRef::new("note", 0, MaxOccurs::Unbounded, Compositor::Choice),
                ChildRef::new("quote", 1, MaxOccurs::Bounded(1), Compositor::Choice),
            ]
        );
    }

    #[test]
    fn test_nested_compositors_and_group_refs() {
        let elements = extract(
            r#"<xs:element name="div"><xs:complexType>
                 <xs:sequence>
                   <xs:element name="head"/>
                   <xs:choice maxOccurs="unbounded">
                     <xs:group ref="model.pLike" minOccurs="0"/>
                   </xs:choice>
                 </xs:sequence>
               </xs:complexType></xs:element>"#,
        );
        let div = &elements[0];

        assert_eq!(div.child_refs[0].compositor, Compositor::Sequence);
        assert_eq!(
            div.group_refs,
            vec![GroupRef {
                name: "model.pLike".to_string(),
                min_occurs: 0,
                max_occurs: MaxOccurs::Bounded(1),
                compositor: Compositor::Choice,
            }]
        );
    }

    #[test]
    fn test_named_type_and_documentation_fallback() {
        let elements = extract(
            r#"<xs:complexType name="pType" mixed="true">
                 <xs:annotation><xs:documentation>paragraph type</xs:documentation></xs:annotation>
                 <xs:attribute name="n"/>
                 <xs:attributeGroup ref="att.global"/>
               </xs:complexType>
               <xs:element name="p" type="pType"/>"#,
        );
        let p = &elements[0];

        assert_eq!(p.content_kind, ContentKind::Mixed);
        assert_eq!(p.documentation, "paragraph type");
        assert_eq!(p.attributes[0].name, "n");
        assert_eq!(p.attribute_group_refs, vec!["att.global"]);
    }

    #[test]
    fn test_extension_inherits_base_content_and_mixed() {
        let elements = extract(
            r#"<xs:complexType name="base" mixed="true">
                 <xs:sequence><xs:element ref="hi"/></xs:sequence>
                 <xs:attribute name="rend"/>
               </xs:complexType>
               <xs:element name="p"><xs:complexType><xs:complexContent>
                 <xs:extension base="base"><xs:sequence><xs:element ref="note"/></xs:sequence></xs:extension>
               </xs:complexContent></xs:complexType></xs:element>"#,
        );
        let p = &elements[0];
        let names: Vec<_> = p.child_refs.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["hi", "note"]);
        assert_eq!(p.content_kind, ContentKind::Mixed);
        assert_eq!(p.attributes[0].name, "rend");
    }

    #[test]
    fn test_cyclic_derivation_terminates() {
        let elements = extract(
            r#"<xs:complexType name="a"><xs:complexContent><xs:extension base="b">
                 <xs:sequence><xs:element ref="x"/></xs:sequence>
               </xs:extension></xs:complexContent></xs:complexType>
               <xs:complexType name="b"><xs:complexContent><xs:extension base="a"/></xs:complexContent></xs:complexType>
               <xs:element name="e" type="a"/>"#,
        );
        let names: Vec<_> = elements[0].child_refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn test_simple_content_is_text() {
        let elements = extract(
            r#"<xs:element name="num"><xs:complexType><xs:simpleContent>
                 <xs:extension base="xs:decimal"><xs:attribute name="unit"/></xs:extension>
               </xs:simpleContent></xs:complexType></xs:element>
               <xs:element name="title" type="xs:string"/>
               <xs:element name="label"><xs:simpleType><xs:restriction base="xs:token"/></xs:simpleType></xs:element>
               <xs:element name="gap"/>
               <xs:element><xs:complexType/></xs:element>"#,
        );

        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0].content_kind, ContentKind::Text);
        assert_eq!(elements[0].attributes[0].name, "unit");
        assert_eq!(elements[1].content_kind, ContentKind::Text);
        assert_eq!(elements[2].content_kind, ContentKind::Text);
        assert_eq!(elements[3].content_kind, ContentKind::Empty);
    }
}

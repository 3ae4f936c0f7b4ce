//! End-to-end extraction tests for sne-adapter-xsd

use sne_adapter_xsd::parse_xsd;
use sne_model::{
    ChildRef, Compositor, ContentKind, Error, ExtractOptions, MaxOccurs, Schema, SchemaFormat,
};

/// Helper to parse a schema body wrapped in an `xs:schema` root
fn parse(body: &str) -> Schema {
    let text = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:tei="http://www.tei-c.org/ns/1.0">
{body}
</xs:schema>"#
    );
    parse_xsd(&text, "test", &ExtractOptions::default()).unwrap()
}

/// A small TEI-like schema with groups, attribute groups and a cycle
fn tei_like() -> Schema {
    parse(
        r#"
  <xs:group name="model.pLike">
    <xs:choice><xs:element ref="tei:p"/><xs:element ref="ab"/></xs:choice>
  </xs:group>
  <xs:group name="model.phrase">
    <xs:choice>
      <xs:element ref="hi"/>
      <xs:element ref="emph"/>
      <xs:group ref="model.highlighted"/>
    </xs:choice>
  </xs:group>
  <xs:group name="model.highlighted">
    <xs:choice><xs:element ref="foreign"/><xs:group ref="model.phrase"/></xs:choice>
  </xs:group>
  <xs:attributeGroup name="att.global">
    <xs:attribute name="xml:id" type="xs:ID"/>
    <xs:attributeGroup ref="att.rendition"/>
  </xs:attributeGroup>
  <xs:attributeGroup name="att.rendition">
    <xs:attribute name="rend" type="xs:string"/>
  </xs:attributeGroup>

  <xs:element name="div">
    <xs:annotation><xs:documentation>text division</xs:documentation></xs:annotation>
    <xs:complexType>
      <xs:sequence>
        <xs:element ref="head" minOccurs="0"/>
        <xs:group ref="model.pLike" maxOccurs="unbounded"/>
      </xs:sequence>
      <xs:attributeGroup ref="att.global"/>
    </xs:complexType>
  </xs:element>
  <xs:element name="p">
    <xs:complexType mixed="true">
      <xs:choice minOccurs="0" maxOccurs="unbounded">
        <xs:group ref="model.phrase"/>
        <xs:element ref="hi" minOccurs="1" maxOccurs="1"/>
      </xs:choice>
      <xs:attribute name="rend" type="xs:token" use="required"/>
      <xs:attributeGroup ref="att.global"/>
      <xs:attributeGroup ref="att.missing"/>
    </xs:complexType>
  </xs:element>
  <xs:element name="ab"><xs:complexType><xs:group ref="model.phrase"/></xs:complexType></xs:element>
  <xs:element name="head" type="xs:string"/>
  <xs:element name="hi"><xs:complexType mixed="true"/></xs:element>
  <xs:element name="emph"><xs:complexType mixed="true"/></xs:element>
  <xs:element name="foreign"><xs:complexType mixed="true"/></xs:element>
"#,
    )
}

#[test]
fn test_choice_scenario() {
    let schema = parse(
        r#"<xs:element name="p"><xs:complexType><xs:choice>
             <xs:element ref="note" minOccurs="0" maxOccurs="unbounded"/>
             <xs:element ref="quote"/>
           </xs:choice></xs:complexType></xs:element>"#,
    );
    let p = schema.element("p").unwrap();

    assert_eq!(p.children, vec!["note", "quote"]);
    assert_eq!(
        p.child_ref("note"),
        Some(&ChildRef::new("note", 0, MaxOccurs::Unbounded, Compositor::Choice))
    );
    assert_eq!(
        p.child_ref("quote"),
        Some(&ChildRef::new("quote", 1, MaxOccurs::Bounded(1), Compositor::Choice))
    );
}

#[test]
fn test_schema_satisfies_invariants() {
    let schema = tei_like();
    assert_eq!(schema.format, SchemaFormat::Xsd);
    assert_eq!(schema.name, "test");
    assert_eq!(schema.verify(), Ok(()));
    assert_eq!(
        schema.element_names,
        vec!["ab", "div", "emph", "foreign", "head", "hi", "p"]
    );
}

#[test]
fn test_group_reference_takes_referencing_cardinality() {
    let schema = tei_like();
    let div = schema.element("div").unwrap();

    assert_eq!(div.children, vec!["ab", "head", "p"]);
    assert_eq!(
        div.child_ref("p"),
        Some(&ChildRef::new("p", 1, MaxOccurs::Unbounded, Compositor::Sequence))
    );
    assert_eq!(
        div.child_ref("head"),
        Some(&ChildRef::new("head", 0, MaxOccurs::Bounded(1), Compositor::Sequence))
    );
    assert_eq!(div.documentation, "text division");
}

#[test]
fn test_cyclic_groups_resolve_to_finite_members() {
    let schema = tei_like();

    assert_eq!(schema.model_classes["model.phrase"], vec!["emph", "foreign", "hi"]);
    assert_eq!(schema.model_classes["model.highlighted"], vec!["emph", "foreign", "hi"]);

    let p = schema.element("p").unwrap();
    assert_eq!(p.children, vec!["emph", "foreign", "hi"]);
}

#[test]
fn test_direct_and_group_occurrences_merge() {
    let schema = tei_like();
    let p = schema.element("p").unwrap();

    // `hi` appears directly (1..1) and through model.phrase (1..1), both in a choice
    assert_eq!(
        p.child_ref("hi"),
        Some(&ChildRef::new("hi", 1, MaxOccurs::Bounded(1), Compositor::Choice))
    );
    assert_eq!(p.content_kind, ContentKind::Mixed);
}

#[test]
fn test_group_only_content_becomes_element() {
    let schema = tei_like();
    let ab = schema.element("ab").unwrap();

    assert_eq!(ab.children, vec!["emph", "foreign", "hi"]);
    assert_eq!(ab.content_kind, ContentKind::Element);
    assert_eq!(
        ab.child_ref("hi").map(|r| r.compositor),
        Some(Compositor::Sequence)
    );
}

#[test]
fn test_parents_are_reverse_index() {
    let schema = tei_like();

    assert_eq!(schema.element("hi").unwrap().parents, vec!["ab", "p"]);
    assert_eq!(schema.element("p").unwrap().parents, vec!["div"]);
    assert!(schema.element("div").unwrap().parents.is_empty());
}

#[test]
fn test_member_of_uses_flattened_groups() {
    let schema = tei_like();

    assert_eq!(
        schema.element("hi").unwrap().member_of,
        vec!["model.highlighted", "model.phrase"]
    );
    assert_eq!(schema.element("p").unwrap().member_of, vec!["model.pLike"]);
    assert!(schema.element("div").unwrap().member_of.is_empty());
}

#[test]
fn test_attributes_own_first_then_groups() {
    let schema = tei_like();
    let p = schema.element("p").unwrap();

    let names: Vec<_> = p.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["id", "rend"]);

    // The element's own declaration wins over att.rendition's
    let rend = p.attribute("rend").unwrap();
    assert!(rend.required);
    assert_eq!(rend.data_type, "token");
    assert_eq!(rend.from_class, None);

    let id = p.attribute("id").unwrap();
    assert_eq!(id.from_class.as_deref(), Some("att.global"));

    assert_eq!(p.attribute_classes, vec!["att.global"]);
}

#[test]
fn test_unresolved_attribute_group_is_not_a_class() {
    let schema = parse(
        r#"<xs:element name="ptr"><xs:complexType>
             <xs:attribute name="target" type="xs:anyURI"/>
             <xs:attributeGroup ref="att.pointing"/>
           </xs:complexType></xs:element>"#,
    );

    let ptr = schema.element("ptr").unwrap();
    assert!(ptr.attribute_classes.is_empty());
    assert_eq!(ptr.attributes.len(), 1);
    assert!(!schema.attribute_classes.contains_key("att.pointing"));
    assert_eq!(schema.verify(), Ok(()));
}

#[test]
fn test_attribute_classes_flattened() {
    let schema = tei_like();
    let global = &schema.attribute_classes["att.global"];

    let names: Vec<_> = global
        .iter()
        .map(|a| (a.name.as_str(), a.from_class.as_deref()))
        .collect();
    assert_eq!(
        names,
        vec![("id", Some("att.global")), ("rend", Some("att.rendition"))]
    );
}

#[test]
fn test_content_kinds() {
    let schema = tei_like();

    assert_eq!(schema.element("head").unwrap().content_kind, ContentKind::Text);
    assert_eq!(schema.element("div").unwrap().content_kind, ContentKind::Element);
    assert_eq!(schema.element("hi").unwrap().content_kind, ContentKind::Mixed);
}

#[test]
fn test_unresolved_references_are_dropped() {
    let schema = parse(
        r#"<xs:element name="e" type="missingType"/>
           <xs:element name="f"><xs:complexType><xs:sequence>
             <xs:group ref="missingGroup"/>
             <xs:element ref="g"/>
           </xs:sequence></xs:complexType></xs:element>"#,
    );

    let e = schema.element("e").unwrap();
    assert_eq!(e.content_kind, ContentKind::Empty);
    assert!(e.children.is_empty());
    assert_eq!(schema.element("f").unwrap().children, vec!["g"]);
    assert!(schema.element("g").is_none());
    assert_eq!(schema.verify(), Ok(()));
}

#[test]
fn test_unprefixed_schema_in_default_namespace() {
    let text = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
        <element name="title" type="string"/>
        <element name="doc"><complexType><sequence><element ref="title"/></sequence></complexType></element>
      </schema>"#;
    let schema = parse_xsd(text, "plain", &ExtractOptions::default()).unwrap();

    assert_eq!(schema.element("title").unwrap().content_kind, ContentKind::Text);
    assert_eq!(schema.element("title").unwrap().parents, vec!["doc"]);
}

#[test]
fn test_record_round_trip() -> anyhow::Result<()> {
    let schema = tei_like();
    let restored = Schema::from_json(&schema.to_json(true)?)?;
    assert_eq!(restored, schema);
    Ok(())
}

#[test]
fn test_size_limit_is_enforced() {
    let options = ExtractOptions::new().max_input_bytes(8);
    let err = parse_xsd("<xs:schema/>                ", "big", &options).unwrap_err();
    assert!(err.to_string().starts_with("XSD parse error: document is"));
}

/// `depth` nested compositors inside one element declaration
fn deeply_nested(depth: usize) -> String {
    format!(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
<xs:element name="p"><xs:complexType>{}<xs:element ref="hi"/>{}</xs:complexType></xs:element>
</xs:schema>"#,
        "<xs:sequence>".repeat(depth),
        "</xs:sequence>".repeat(depth)
    )
}

#[test]
fn test_deep_nesting_is_malformed() {
    let err = parse_xsd(&deeply_nested(30_000), "deep", &ExtractOptions::default()).unwrap_err();
    match err {
        Error::Malformed { format, message } => {
            assert_eq!(format, SchemaFormat::Xsd);
            assert!(message.contains("nesting too deep"), "{message}");
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn test_depth_limit_is_configurable() {
    let text = deeply_nested(20);
    let schema = parse_xsd(&text, "nested", &ExtractOptions::default()).unwrap();
    assert_eq!(schema.element("p").unwrap().children, vec!["hi"]);

    let options = ExtractOptions::new().max_depth(10);
    assert!(matches!(
        parse_xsd(&text, "nested", &options),
        Err(Error::Malformed { .. })
    ));
}

/// `p` whose type derives from a chain of `length` complex types; the last
/// base declares the content
fn derivation_chain(length: usize) -> String {
    let mut body = String::from(r#"<xs:element name="p" type="t0"/>"#);
    for i in 0..length {
        if i + 1 == length {
            body.push_str(&format!(
                r#"<xs:complexType name="t{i}"><xs:sequence><xs:element ref="hi"/></xs:sequence></xs:complexType>"#
            ));
        } else {
            body.push_str(&format!(
                r#"<xs:complexType name="t{i}"><xs:complexContent><xs:extension base="t{}"/></xs:complexContent></xs:complexType>"#,
                i + 1
            ));
        }
    }
    body
}

#[test]
fn test_long_derivation_chains_stop_at_the_depth_limit() {
    let schema = parse(&derivation_chain(5));
    assert_eq!(schema.element("p").unwrap().children, vec!["hi"]);

    let schema = parse(&derivation_chain(5_000));
    assert!(schema.element("p").unwrap().children.is_empty());
    assert_eq!(schema.verify(), Ok(()));
}

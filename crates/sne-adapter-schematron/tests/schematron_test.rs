//! Standalone Schematron schemas and rule lookup

use sne_adapter_schematron::{PLACEHOLDER_DOCUMENTATION, extract_rules, parse_schematron};
use sne_model::{ContentKind, ExtractOptions, RuleKind, Schema, SchemaFormat};

const RULES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sch:schema xmlns:sch="http://purl.oclc.org/dsdl/schematron" queryBinding="xslt2">
  <sch:ns prefix="tei" uri="http://www.tei-c.org/ns/1.0"/>
  <sch:pattern id="chapters">
    <sch:rule context="tei:div[@type='chapter']">
      <sch:assert test="tei:head">A chapter needs a heading.</sch:assert>
      <sch:report test="tei:div[@type='chapter']">Chapters do not nest.</sch:report>
    </sch:rule>
  </sch:pattern>
  <sch:pattern name="ids">
    <sch:rule context="tei:*[@subtype]">
      <sch:assert test="@type">subtype requires type</sch:assert>
    </sch:rule>
    <sch:rule context="tei:note">
      <sch:assert test="@place">Notes need a place.</sch:assert>
    </sch:rule>
  </sch:pattern>
  <sch:pattern id="more-chapters">
    <sch:rule context="tei:div">
      <sch:assert test="@n">Divisions are numbered.</sch:assert>
    </sch:rule>
  </sch:pattern>
</sch:schema>"#;

fn standalone() -> Schema {
    parse_schematron(RULES, "rules", &ExtractOptions::default()).unwrap()
}

#[test]
fn test_schematron_matching_scenario() {
    let schema = standalone();

    let for_div: Vec<_> = schema
        .rules_for_element("div")
        .iter()
        .map(|r| r.message.as_str())
        .collect();
    assert_eq!(
        for_div,
        vec![
            "A chapter needs a heading.",
            "Chapters do not nest.",
            "subtype requires type",
            "Divisions are numbered.",
        ]
    );

    let for_p: Vec<_> = schema
        .rules_for_element("p")
        .iter()
        .map(|r| r.test.as_str())
        .collect();
    assert_eq!(for_p, vec!["@type"]);
}

#[test]
fn test_rules_in_document_order() -> anyhow::Result<()> {
    let rules = extract_rules(RULES, &ExtractOptions::default())?;

    assert_eq!(rules.len(), 5);
    assert_eq!(rules[1].kind, RuleKind::Report);
    assert_eq!(rules[2].pattern_id, "ids");
    assert_eq!(rules[2].context, "tei:*[@subtype]");
    Ok(())
}

#[test]
fn test_standalone_placeholder_elements() {
    let schema = standalone();

    assert_eq!(schema.format, SchemaFormat::Schematron);
    assert_eq!(schema.element_names, vec!["div", "note"]);
    let note = schema.element("note").unwrap();
    assert_eq!(note.documentation, PLACEHOLDER_DOCUMENTATION);
    assert_eq!(note.content_kind, ContentKind::Unknown);
    assert!(note.attributes.is_empty());
    assert!(schema.model_classes.is_empty());
    assert_eq!(schema.verify(), Ok(()));
}

#[test]
fn test_document_without_patterns() {
    let schema = parse_schematron(
        r#"<schema xmlns="http://purl.oclc.org/dsdl/schematron"><title>empty</title></schema>"#,
        "empty",
        &ExtractOptions::default(),
    )
    .unwrap();
    assert!(schema.elements.is_empty());
    assert!(schema.schematron_rules.is_empty());
}

#[test]
fn test_record_round_trip_keeps_rules() -> anyhow::Result<()> {
    let schema = standalone();
    let restored = Schema::from_json(&schema.to_json(false)?)?;
    assert_eq!(restored.schematron_rules, schema.schematron_rules);
    assert_eq!(restored, schema);
    Ok(())
}

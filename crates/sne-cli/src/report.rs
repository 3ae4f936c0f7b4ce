//! Plain-text rendering of schemas for the terminal

use sne_model::{Element, Schema, SchematronRule};
use std::io::{self, Write};

/// Summary line followed by the sorted element names
pub fn write_summary(out: &mut impl Write, schema: &Schema) -> io::Result<()> {
    writeln!(
        out,
        "{} ({}): {} elements, {} model classes, {} attribute classes, {} rules",
        schema.name,
        schema.format.display_name(),
        schema.element_names.len(),
        schema.model_classes.len(),
        schema.attribute_classes.len(),
        schema.schematron_rules.len()
    )?;
    for name in &schema.element_names {
        writeln!(out, "  {name}")?;
    }
    Ok(())
}

/// Full description of one element
pub fn write_element(out: &mut impl Write, schema: &Schema, element: &Element) -> io::Result<()> {
    writeln!(out, "{}", element.name)?;
    if !element.documentation.is_empty() {
        writeln!(out, "  documentation: {}", element.documentation)?;
    }
    writeln!(out, "  content: {}", element.content_kind)?;
    write_list(out, "parents", &element.parents)?;

    if !element.child_refs.is_empty() {
        writeln!(out, "  children:")?;
        for child in &element.child_refs {
            writeln!(
                out,
                "    {} [{}..{}] {}",
                child.name, child.min_occurs, child.max_occurs, child.compositor
            )?;
        }
    }

    if !element.attributes.is_empty() {
        writeln!(out, "  attributes:")?;
        for attribute in &element.attributes {
            write!(out, "    {}: {}", attribute.name, attribute.data_type)?;
            if let Some(values) = &attribute.values {
                write!(out, " {{{}}}", values.join(", "))?;
            }
            if attribute.required {
                write!(out, " (required)")?;
            }
            if let Some(class) = &attribute.from_class {
                write!(out, " from {class}")?;
            }
            writeln!(out)?;
        }
    }

    write_list(out, "member of", &element.member_of)?;
    write_list(out, "attribute classes", &element.attribute_classes)?;

    let rules = schema.rules_for_element(&element.name);
    if !rules.is_empty() {
        writeln!(out, "  rules:")?;
        for rule in rules {
            write!(out, "    ")?;
            write_rule(out, rule)?;
        }
    }
    Ok(())
}

/// One line per rule
pub fn write_rules<'a>(
    out: &mut impl Write,
    rules: impl IntoIterator<Item = &'a SchematronRule>,
) -> io::Result<()> {
    for rule in rules {
        write_rule(out, rule)?;
    }
    Ok(())
}

fn write_rule(out: &mut impl Write, rule: &SchematronRule) -> io::Result<()> {
    let pattern = if rule.pattern_id.is_empty() {
        "-"
    } else {
        rule.pattern_id.as_str()
    };
    writeln!(
        out,
        "[{}] {} {}: {} => {}",
        rule.kind, pattern, rule.context, rule.test, rule.message
    )
}

fn write_list(out: &mut impl Write, label: &str, items: &[String]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {label}: {}", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sne_model::{Attribute, ChildRef, RuleKind, SchemaBuilder, SchemaFormat};

    fn sample() -> Schema {
        let mut builder = SchemaBuilder::new("tei", SchemaFormat::Xsd);
        {
            let div = builder.element_mut("div");
            div.add_child(ChildRef::class_member("p"));
            div.add_attribute(Attribute::new("n").with_required(true));
            div.add_attribute(
                Attribute::new("rend")
                    .with_values(vec!["bold".to_string(), "italic".to_string()])
                    .with_from_class("att.global"),
            );
        }
        builder.element_mut("p");
        builder.rules(vec![SchematronRule {
            pattern_id: "numbering".to_string(),
            context: "tei:div".to_string(),
            test: "@n".to_string(),
            message: "Divisions are numbered.".to_string(),
            kind: RuleKind::Assert,
        }]);
        builder.build()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary() {
        let schema = sample();
        let text = render(|out| write_summary(out, &schema));
        assert_eq!(
            text,
            "tei (XSD): 2 elements, 0 model classes, 0 attribute classes, 1 rules\n  div\n  p\n"
        );
    }

    #[test]
    fn test_element_details() {
        let schema = sample();
        let div = schema.element("div").unwrap();
        let text = render(|out| write_element(out, &schema, div));

        assert!(text.starts_with("div\n"));
        assert!(text.contains("    p [0..unbounded] choice\n"));
        assert!(text.contains("    n: string (required)\n"));
        assert!(text.contains("    rend: enumeration {bold, italic} from att.global\n"));
        assert!(text.contains("[assert] numbering tei:div: @n => Divisions are numbered.\n"));
        assert!(!text.contains("parents"));
    }

    #[test]
    fn test_element_without_rules_or_children() {
        let schema = sample();
        let p = schema.element("p").unwrap();
        let text = render(|out| write_element(out, &schema, p));
        assert_eq!(text, "p\n  content: empty\n  parents: div\n");
    }

    #[test]
    fn test_rule_without_pattern_id() {
        let rule = SchematronRule {
            pattern_id: String::new(),
            context: "*".to_string(),
            test: "true()".to_string(),
            message: "anything".to_string(),
            kind: RuleKind::Report,
        };
        let text = render(|out| write_rules(out, [&rule]));
        assert_eq!(text, "[report] - *: true() => anything\n");
    }
}

//! Document-order rule collection

use crate::is_schematron;
use sne_model::{RuleKind, SchematronRule};
use sne_xml::{Traversal, XmlNode};
use tracing::trace;

/// Collects `assert` and `report` nodes as [`SchematronRule`]s.
///
/// Pre-order traversal means the most recently visited `pattern` and `rule`
/// are the ancestors of any check being visited.
#[derive(Debug, Default)]
pub struct RuleCollector {
    pattern_id: String,
    context: String,
    rules: Vec<SchematronRule>,
}

impl RuleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_rules(self) -> Vec<SchematronRule> {
        self.rules
    }
}

impl Traversal for RuleCollector {
    fn visit(&mut self, node: &XmlNode, path: &[String]) {
        if !is_schematron(node) {
            return;
        }

        match node.local_name.as_str() {
            "pattern" => {
                self.pattern_id = node
                    .attribute("id")
                    .or_else(|| node.attribute("name"))
                    .unwrap_or_default()
                    .to_string();
            }
            "rule" => {
                self.context = node.attribute("context").unwrap_or_default().to_string();
            }
            "assert" | "report" => {
                let in_pattern_rule = path.last().is_some_and(|p| p == "rule")
                    && path.iter().any(|p| p == "pattern");
                if !in_pattern_rule {
                    trace!("Ignoring <{}> outside a pattern rule", node.name);
                    return;
                }
                let kind = if node.local_name == "assert" {
                    RuleKind::Assert
                } else {
                    RuleKind::Report
                };
                self.rules.push(SchematronRule {
                    pattern_id: self.pattern_id.clone(),
                    context: self.context.clone(),
                    test: node.attribute("test").unwrap_or_default().to_string(),
                    message: node.normalized_text(),
                    kind,
                });
            }
            _ => {}
        }
    }
}

//! Unified schema graph definitions
#![allow(clippy::must_use_candidate)] // Constructor/accessor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::rules::context_element;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Source format of a loaded schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    /// W3C XML Schema
    Xsd,
    /// RelaxNG (XML syntax)
    Rng,
    /// TEI ODD customization
    Odd,
    /// ISO Schematron
    Schematron,
}

impl SchemaFormat {
    /// All supported formats
    pub const ALL: [SchemaFormat; 4] = [
        SchemaFormat::Xsd,
        SchemaFormat::Rng,
        SchemaFormat::Odd,
        SchemaFormat::Schematron,
    ];

    /// Lowercase format tag (`xsd`, `rng`, `odd`, `schematron`)
    pub fn tag(self) -> &'static str {
        match self {
            SchemaFormat::Xsd => "xsd",
            SchemaFormat::Rng => "rng",
            SchemaFormat::Odd => "odd",
            SchemaFormat::Schematron => "schematron",
        }
    }

    /// Human-readable format name used in error messages
    pub fn display_name(self) -> &'static str {
        match self {
            SchemaFormat::Xsd => "XSD",
            SchemaFormat::Rng => "RelaxNG",
            SchemaFormat::Odd => "ODD",
            SchemaFormat::Schematron => "Schematron",
        }
    }

    /// Whether schemas of this format carry a content model (children and parents)
    pub fn has_content_model(self) -> bool {
        matches!(self, SchemaFormat::Xsd | SchemaFormat::Rng)
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SchemaFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SchemaFormat::ALL
            .into_iter()
            .find(|format| format.tag() == s)
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// Combination rule for a group of child references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compositor {
    #[default]
    Sequence,
    Choice,
    All,
}

impl Compositor {
    /// Parse a compositor from an XSD/RelaxNG local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "sequence" => Some(Compositor::Sequence),
            "choice" => Some(Compositor::Choice),
            "all" => Some(Compositor::All),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compositor::Sequence => "sequence",
            Compositor::Choice => "choice",
            Compositor::All => "all",
        }
    }
}

impl fmt::Display for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper occurrence bound of a child reference
///
/// Serialized as a plain number or the string `"unbounded"`. Bounded values
/// order below `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "OccursRepr", into = "OccursRepr")]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl MaxOccurs {
    pub fn is_unbounded(self) -> bool {
        self == MaxOccurs::Unbounded
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxOccurs::Bounded(n) => write!(f, "{n}"),
            MaxOccurs::Unbounded => f.write_str("unbounded"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OccursRepr {
    Number(u32),
    Text(String),
}

impl From<MaxOccurs> for OccursRepr {
    fn from(value: MaxOccurs) -> Self {
        match value {
            MaxOccurs::Bounded(n) => OccursRepr::Number(n),
            MaxOccurs::Unbounded => OccursRepr::Text("unbounded".to_string()),
        }
    }
}

impl TryFrom<OccursRepr> for MaxOccurs {
    type Error = String;

    fn try_from(value: OccursRepr) -> std::result::Result<Self, Self::Error> {
        match value {
            OccursRepr::Number(n) => Ok(MaxOccurs::Bounded(n)),
            OccursRepr::Text(text) if text == "unbounded" => Ok(MaxOccurs::Unbounded),
            OccursRepr::Text(text) => text
                .parse()
                .map(MaxOccurs::Bounded)
                .map_err(|_| format!("invalid maxOccurs value '{text}'")),
        }
    }
}

/// Structural kind of an element's content
///
/// Serialized as its tag (`empty`, `text`, `element`, `mixed`, `unknown`)
/// or, for ODD module labels, as `module: <label>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentKind {
    #[default]
    Empty,
    Text,
    Element,
    Mixed,
    Unknown,
    /// Free-form module label (ODD)
    Module(String),
}

impl ContentKind {
    fn rank(&self) -> u8 {
        match self {
            ContentKind::Unknown | ContentKind::Module(_) => 0,
            ContentKind::Empty => 1,
            ContentKind::Text => 2,
            ContentKind::Element => 3,
            ContentKind::Mixed => 4,
        }
    }

    /// Combine two findings about the same content: `mixed > element > text > empty`
    pub fn merge(self, incoming: ContentKind) -> ContentKind {
        if incoming.rank() > self.rank() {
            incoming
        } else {
            self
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Empty => f.write_str("empty"),
            ContentKind::Text => f.write_str("text"),
            ContentKind::Element => f.write_str("element"),
            ContentKind::Mixed => f.write_str("mixed"),
            ContentKind::Unknown => f.write_str("unknown"),
            ContentKind::Module(label) => write!(f, "module: {label}"),
        }
    }
}

impl From<ContentKind> for String {
    fn from(value: ContentKind) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ContentKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "empty" => Ok(ContentKind::Empty),
            "text" => Ok(ContentKind::Text),
            "element" => Ok(ContentKind::Element),
            "mixed" => Ok(ContentKind::Mixed),
            "unknown" => Ok(ContentKind::Unknown),
            other => other
                .strip_prefix("module: ")
                .map(|label| ContentKind::Module(label.to_string()))
                .ok_or_else(|| format!("invalid content kind '{other}'")),
        }
    }
}

/// One merged occurrence constraint for a child within its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    pub name: String,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub compositor: Compositor,
}

impl ChildRef {
    pub fn new(
        name: impl Into<String>,
        min_occurs: u32,
        max_occurs: MaxOccurs,
        compositor: Compositor,
    ) -> Self {
        Self {
            name: name.into(),
            min_occurs,
            max_occurs,
            compositor,
        }
    }

    /// Default occurrence: exactly once, in sequence
    pub fn once(name: impl Into<String>) -> Self {
        Self::new(name, 1, MaxOccurs::Bounded(1), Compositor::Sequence)
    }

    /// Default for a member contributed by an expanded model class
    pub fn class_member(name: impl Into<String>) -> Self {
        Self::new(name, 0, MaxOccurs::Unbounded, Compositor::Choice)
    }
}

/// An attribute declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub documentation: String,
    /// Primitive type name, or `enumeration` when `values` is present
    pub data_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    /// Attribute class this declaration was inherited from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_class: Option<String>,
}

impl Attribute {
    /// Optional `string` attribute with no documentation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: String::new(),
            data_type: "string".to_string(),
            required: false,
            values: None,
            from_class: None,
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the allowed values; the data type becomes `enumeration`
    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = Some(values);
        self.data_type = "enumeration".to_string();
        self
    }

    pub fn with_from_class(mut self, class: impl Into<String>) -> Self {
        self.from_class = Some(class.into());
        self
    }
}

/// Whether a Schematron check fires on failure or on success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Assert,
    Report,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Assert => f.write_str("assert"),
            RuleKind::Report => f.write_str("report"),
        }
    }
}

/// A single Schematron assertion or report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematronRule {
    pub pattern_id: String,
    pub context: String,
    pub test: String,
    pub message: String,
    pub kind: RuleKind,
}

impl SchematronRule {
    /// Element name recovered from the rule context, `*` for wildcards
    pub fn target(&self) -> Option<&str> {
        context_element(&self.context)
    }

    /// Whether the rule applies to `element`: exact name match or wildcard
    pub fn applies_to(&self, element: &str) -> bool {
        self.target()
            .is_some_and(|target| target == "*" || target == element)
    }
}

/// A named element of the unified graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    pub documentation: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub child_refs: Vec<ChildRef>,
    pub attributes: Vec<Attribute>,
    pub content_kind: ContentKind,
    pub member_of: Vec<String>,
    pub attribute_classes: Vec<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: String::new(),
            parents: Vec::new(),
            children: Vec::new(),
            child_refs: Vec::new(),
            attributes: Vec::new(),
            content_kind: ContentKind::Empty,
            member_of: Vec::new(),
            attribute_classes: Vec::new(),
        }
    }

    /// Merged occurrence constraint for a child
    pub fn child_ref(&self, child: &str) -> Option<&ChildRef> {
        self.child_refs.iter().find(|r| r.name == child)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A loaded schema: the unified graph of one source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,
    pub format: SchemaFormat,
    pub elements: BTreeMap<String, Element>,
    pub model_classes: BTreeMap<String, Vec<String>>,
    pub attribute_classes: BTreeMap<String, Vec<Attribute>>,
    /// Sorted element names; always equal to the keys of `elements`
    pub element_names: Vec<String>,
    /// Rules in document order
    pub schematron_rules: Vec<SchematronRule>,
}

impl Schema {
    /// Create a schema with no elements
    pub fn new(name: impl Into<String>, format: SchemaFormat) -> Self {
        Self {
            name: name.into(),
            format,
            elements: BTreeMap::new(),
            model_classes: BTreeMap::new(),
            attribute_classes: BTreeMap::new(),
            element_names: Vec::new(),
            schematron_rules: Vec::new(),
        }
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.get(name)
    }

    /// Rules applicable to `element`, in rule order
    pub fn rules_for_element(&self, element: &str) -> Vec<&SchematronRule> {
        self.schematron_rules
            .iter()
            .filter(|rule| rule.applies_to(element))
            .collect()
    }

    /// A copy of this schema with `rules` appended after the existing rules
    pub fn with_schematron_rules(&self, rules: impl IntoIterator<Item = SchematronRule>) -> Schema {
        let mut merged = self.clone();
        merged.schematron_rules.extend(rules);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(context: &str) -> SchematronRule {
        SchematronRule {
            pattern_id: "p1".to_string(),
            context: context.to_string(),
            test: "true()".to_string(),
            message: "msg".to_string(),
            kind: RuleKind::Assert,
        }
    }

    #[test]
    fn test_format_tags_round_trip() {
        for format in SchemaFormat::ALL {
            assert_eq!(format.tag().parse::<SchemaFormat>().unwrap(), format);
        }
        assert!(matches!(
            "dtd".parse::<SchemaFormat>(),
            Err(Error::UnknownFormat(tag)) if tag == "dtd"
        ));
    }

    #[test]
    fn test_format_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SchemaFormat::Schematron).unwrap(),
            "\"schematron\""
        );
    }

    #[test]
    fn test_max_occurs_serialization() {
        assert_eq!(serde_json::to_string(&MaxOccurs::Bounded(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&MaxOccurs::Unbounded).unwrap(),
            "\"unbounded\""
        );
        assert_eq!(
            serde_json::from_str::<MaxOccurs>("\"unbounded\"").unwrap(),
            MaxOccurs::Unbounded
        );
        assert_eq!(serde_json::from_str::<MaxOccurs>("2").unwrap(), MaxOccurs::Bounded(2));
        assert!(serde_json::from_str::<MaxOccurs>("\"many\"").is_err());
    }

    #[test]
    fn test_max_occurs_ordering() {
        assert!(MaxOccurs::Bounded(1) < MaxOccurs::Bounded(5));
        assert!(MaxOccurs::Bounded(u32::MAX) < MaxOccurs::Unbounded);
    }

    #[test]
    fn test_content_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ContentKind::Module("core".to_string())).unwrap(),
            "\"module: core\""
        );
        assert_eq!(
            serde_json::from_str::<ContentKind>("\"module: textstructure\"").unwrap(),
            ContentKind::Module("textstructure".to_string())
        );
        assert_eq!(
            serde_json::from_str::<ContentKind>("\"mixed\"").unwrap(),
            ContentKind::Mixed
        );
        assert!(serde_json::from_str::<ContentKind>("\"weird\"").is_err());
    }

    #[test]
    fn test_content_kind_merge_priority() {
        assert_eq!(ContentKind::Empty.merge(ContentKind::Text), ContentKind::Text);
        assert_eq!(ContentKind::Text.merge(ContentKind::Element), ContentKind::Element);
        assert_eq!(ContentKind::Mixed.merge(ContentKind::Element), ContentKind::Mixed);
        assert_eq!(ContentKind::Element.merge(ContentKind::Empty), ContentKind::Element);
    }

    #[test]
    fn test_child_ref_serializes_camel_case() {
        let json = serde_json::to_value(ChildRef::class_member("hi")).unwrap();
        assert_eq!(json["minOccurs"], 0);
        assert_eq!(json["maxOccurs"], "unbounded");
        assert_eq!(json["compositor"], "choice");
    }

    #[test]
    fn test_rules_for_element_matches_name_and_wildcard() {
        let mut schema = Schema::new("rules", SchemaFormat::Schematron);
        schema.schematron_rules = vec![
            rule("tei:div[@type='chapter']"),
            rule("tei:*[@subtype]"),
            rule("tei:p"),
            rule("@rend"),
        ];

        let div: Vec<_> = schema
            .rules_for_element("div")
            .into_iter()
            .map(|r| r.context.as_str())
            .collect();
        assert_eq!(div, vec!["tei:div[@type='chapter']", "tei:*[@subtype]"]);

        let p = schema.rules_for_element("p");
        assert_eq!(p.len(), 2);
        assert!(p.iter().all(|r| r.context != "tei:div[@type='chapter']"));
    }

    #[test]
    fn test_with_schematron_rules_appends() {
        let mut schema = Schema::new("s", SchemaFormat::Xsd);
        schema.schematron_rules.push(rule("a"));
        let merged = schema.with_schematron_rules(vec![rule("b")]);

        assert_eq!(merged.schematron_rules.len(), 2);
        assert_eq!(merged.schematron_rules[1].context, "b");
        assert_eq!(schema.schematron_rules.len(), 1);
    }

    #[test]
    fn test_attribute_with_values_is_enumeration() {
        let attr = Attribute::new("type").with_values(vec!["a".to_string()]);
        assert_eq!(attr.data_type, "enumeration");
        assert_eq!(attr.values.as_deref(), Some(&["a".to_string()][..]));
    }
}

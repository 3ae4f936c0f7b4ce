//! Subtree serialization back to XML text

use crate::node::{NodeKind, XmlNode};
use crate::{Error, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::collections::BTreeMap;

/// Serialize a subtree to XML text.
///
/// `namespaces` are emitted as `xmlns` declarations on the subtree's top
/// element unless the element already carries an attribute of that name,
/// so a node lifted out of its document keeps its prefixes bound.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn to_xml_string(node: &XmlNode, namespaces: &BTreeMap<String, String>) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, node, Some(namespaces))?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Utf8(e.to_string()))
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &XmlNode,
    namespaces: Option<&BTreeMap<String, String>>,
) -> Result<()> {
    if node.kind == NodeKind::Text {
        let text = node.value.as_deref().unwrap_or_default();
        return writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::Write(e.to_string()));
    }

    let mut start = BytesStart::new(node.name.as_str());
    if let Some(namespaces) = namespaces {
        for (prefix, uri) in namespaces {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{prefix}")
            };
            if !node.attributes.contains_key(&key) {
                start.push_attribute((key.as_str(), uri.as_str()));
            }
        }
    }
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Write(e.to_string()))?;
    for child in &node.children {
        write_node(writer, child, None)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(|e| Error::Write(e.to_string()))
}

//! Key-value record form of a schema
//!
//! Every mapping becomes an ordered list of `{ key, value }` entries so the
//! schema can cross a transport boundary that only carries plain records.
//! Converting back rejects records whose keys or `elementNames` disagree.

use crate::model::{Attribute, Element, Schema, SchemaFormat, SchematronRule};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub key: String,
    pub value: T,
}

/// Transport form of [`Schema`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRecord {
    pub name: String,
    pub format: SchemaFormat,
    pub elements: Vec<Entry<Element>>,
    pub model_classes: Vec<Entry<Vec<String>>>,
    pub attribute_classes: Vec<Entry<Vec<Attribute>>>,
    pub element_names: Vec<String>,
    pub schematron_rules: Vec<SchematronRule>,
}

fn to_entries<T: Clone>(map: &BTreeMap<String, T>) -> Vec<Entry<T>> {
    map.iter()
        .map(|(key, value)| Entry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn from_entries<T>(what: &str, entries: Vec<Entry<T>>) -> Result<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for entry in entries {
        if map.contains_key(&entry.key) {
            return Err(Error::Inconsistent(format!(
                "duplicate {what} key '{}'",
                entry.key
            )));
        }
        map.insert(entry.key, entry.value);
    }
    Ok(map)
}

impl Schema {
    /// Convert to the key-value record form
    pub fn to_record(&self) -> SchemaRecord {
        SchemaRecord {
            name: self.name.clone(),
            format: self.format,
            elements: to_entries(&self.elements),
            model_classes: to_entries(&self.model_classes),
            attribute_classes: to_entries(&self.attribute_classes),
            element_names: self.element_names.clone(),
            schematron_rules: self.schematron_rules.clone(),
        }
    }

    /// Rebuild a schema from its record form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Inconsistent`] when a mapping repeats a key, an
    /// element entry's key differs from its name, or `elementNames` is not
    /// the sorted key set of `elements`.
    pub fn from_record(record: SchemaRecord) -> Result<Schema> {
        let elements = from_entries("element", record.elements)?;
        if let Some((key, element)) = elements.iter().find(|(key, e)| **key != e.name) {
            return Err(Error::Inconsistent(format!(
                "element entry '{key}' holds element '{}'",
                element.name
            )));
        }

        let expected: Vec<&String> = elements.keys().collect();
        let listed: Vec<&String> = record.element_names.iter().collect();
        if expected != listed {
            return Err(Error::Inconsistent(
                "elementNames does not match the element keys".to_string(),
            ));
        }

        Ok(Schema {
            name: record.name,
            format: record.format,
            elements,
            model_classes: from_entries("model class", record.model_classes)?,
            attribute_classes: from_entries("attribute class", record.attribute_classes)?,
            element_names: record.element_names,
            schematron_rules: record.schematron_rules,
        })
    }

    /// Serialize the record form as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let record = self.to_record();
        let json = if pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        Ok(json)
    }

    /// Parse the JSON record form
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the record is inconsistent.
    pub fn from_json(json: &str) -> Result<Schema> {
        let record: SchemaRecord = serde_json::from_str(json)?;
        Schema::from_record(record)
    }
}

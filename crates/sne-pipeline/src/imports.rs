//! XSD import merging
//!
//! Declarations of imported schemas are spliced into the importing document
//! as text, so the XSD extractor sees one self-contained schema.

use sne_adapter_xsd::XS_NS;
use sne_xml::{XmlNode, parse_document, to_xml_string};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Top-level declarations carried over from an imported schema
const DECLARATIONS: [&str; 6] = [
    "element",
    "complexType",
    "simpleType",
    "group",
    "attributeGroup",
    "attribute",
];

/// Resolves an import's `schemaLocation` to document text
pub trait ImportSource {
    /// Text of the document at `location`, or `None` if it is unavailable
    fn fetch(&self, location: &str) -> Option<String>;
}

/// Resolves locations relative to a base directory
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    base_dir: PathBuf,
}

impl FileSystemSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ImportSource for FileSystemSource {
    fn fetch(&self, location: &str) -> Option<String> {
        if location.contains("://") {
            debug!("Not fetching remote import '{}'", location);
            return None;
        }
        let path = self.base_dir.join(location);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to read import '{}': {}", path.display(), e);
                None
            }
        }
    }
}

/// Splice the declarations of every fetchable `import` into `text`.
///
/// Returns `text` unchanged when it does not parse, nothing was imported, or
/// the closing root tag cannot be found.
pub fn merge_imports(text: &str, source: &dyn ImportSource) -> String {
    let document = match parse_document(text) {
        Ok(document) => document,
        Err(e) => {
            debug!("Skipping import merging of unparseable document: {}", e);
            return text.to_string();
        }
    };

    let mut imported = Vec::new();
    for import in import_nodes(&document.root) {
        let Some(location) = import.non_empty_attribute("schemaLocation") else {
            continue;
        };
        let Some(fetched) = source.fetch(location) else {
            continue;
        };
        match declarations(&fetched) {
            Ok(mut fragments) => {
                debug!("Import '{}' contributes {} declarations", location, fragments.len());
                imported.append(&mut fragments);
            }
            Err(e) => warn!("Skipping import '{}': {}", location, e),
        }
    }

    if imported.is_empty() {
        return text.to_string();
    }

    let closing_tag = format!("</{}>", document.root.name);
    let Some(insertion_point) = text.rfind(&closing_tag) else {
        debug!("No closing {} tag, imports not merged", closing_tag);
        return text.to_string();
    };

    info!("Merged {} imported declarations", imported.len());
    let mut merged = String::with_capacity(text.len() + imported.iter().map(String::len).sum::<usize>());
    merged.push_str(&text[..insertion_point]);
    merged.push_str("\n<!-- merged imports -->\n");
    merged.push_str(&imported.join("\n"));
    merged.push('\n');
    merged.push_str(&text[insertion_point..]);
    merged
}

fn import_nodes(root: &XmlNode) -> impl Iterator<Item = &XmlNode> {
    root.element_children().filter(|n| n.is_named("import", XS_NS))
}

/// Serialized top-level declarations of an imported document
fn declarations(text: &str) -> sne_xml::Result<Vec<String>> {
    let document = parse_document(text)?;
    document
        .root
        .element_children()
        .filter(|n| DECLARATIONS.contains(&n.local_name.as_str()))
        .map(|n| to_xml_string(n, &document.namespaces))
        .collect()
}

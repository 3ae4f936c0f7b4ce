//! Format detection from document content and file name

use sne_adapter_odd::TEI_NS;
use sne_adapter_rng::RNG_NS;
use sne_adapter_schematron::NAMESPACES as SCHEMATRON_NAMESPACES;
use sne_adapter_xsd::XS_NS;
use sne_model::SchemaFormat;
use sne_xml::{XmlNode, parse_document};
use std::path::Path;
use tracing::{debug, trace};

/// Detect the format of a schema document, falling back to XSD.
pub fn detect_format(content: &str, file_name: Option<&str>) -> SchemaFormat {
    detect_format_or(content, file_name, SchemaFormat::Xsd)
}

/// Detect the format of a schema document.
///
/// The root element decides when the content parses; otherwise the file
/// extension (`.xsd`, `.rng`, `.odd`, `.sch`); otherwise `fallback`.
pub fn detect_format_or(
    content: &str,
    file_name: Option<&str>,
    fallback: SchemaFormat,
) -> SchemaFormat {
    match parse_document(content) {
        Ok(document) => {
            if let Some(format) = format_from_root(&document.root, content) {
                trace!("Detected {} from the root element", format);
                return format;
            }
        }
        Err(e) => debug!("Format detection could not parse the document: {}", e),
    }

    file_name
        .and_then(format_from_extension)
        .unwrap_or(fallback)
}

/// Format implied by a file name's extension, case-insensitively
pub fn format_from_extension(file_name: &str) -> Option<SchemaFormat> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "xsd" => Some(SchemaFormat::Xsd),
        "rng" => Some(SchemaFormat::Rng),
        "odd" => Some(SchemaFormat::Odd),
        "sch" => Some(SchemaFormat::Schematron),
        _ => None,
    }
}

fn format_from_root(root: &XmlNode, content: &str) -> Option<SchemaFormat> {
    let namespace = root.namespace.as_deref();
    let local = root.local_name.as_str();

    if namespace == Some(XS_NS) || (local == "schema" && content.contains("XMLSchema")) {
        return Some(SchemaFormat::Xsd);
    }
    if namespace == Some(RNG_NS) || (local == "grammar" && content.contains("relaxng.org")) {
        return Some(SchemaFormat::Rng);
    }

    let schematron_root = namespace.is_some_and(|ns| SCHEMATRON_NAMESPACES.contains(&ns))
        || content.contains("schematron");
    if local == "schema" && schematron_root && root.find_descendant("pattern").is_some() {
        return Some(SchemaFormat::Schematron);
    }

    if local == "TEI" && root.descendants().any(|n| n.is_named("schemaSpec", TEI_NS)) {
        return Some(SchemaFormat::Odd);
    }

    None
}

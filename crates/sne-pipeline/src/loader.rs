//! Dispatch to the format extractors and file loading

use crate::detect::detect_format_or;
use crate::imports::{FileSystemSource, merge_imports};
use crate::{Error, Result};
use sne_adapter_odd::parse_odd;
use sne_adapter_rng::parse_rng;
use sne_adapter_schematron::{extract_rules, parse_schematron};
use sne_adapter_xsd::parse_xsd;
use sne_model::{ExtractOptions, Schema, SchemaFormat};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse `text` as `format` into a schema named `name`.
///
/// # Errors
///
/// Returns the extractor's error when the document is malformed.
pub fn parse_schema(
    text: &str,
    name: &str,
    format: SchemaFormat,
    options: &ExtractOptions,
) -> Result<Schema> {
    let schema = match format {
        SchemaFormat::Xsd => parse_xsd(text, name, options)?,
        SchemaFormat::Rng => parse_rng(text, name, options)?,
        SchemaFormat::Odd => parse_odd(text, name, options)?,
        SchemaFormat::Schematron => parse_schematron(text, name, options)?,
    };
    Ok(schema)
}

/// Parse `text` with a format given by its tag (`xsd`, `rng`, `odd`,
/// `schematron`).
///
/// # Errors
///
/// Returns `UnknownFormat` for an unrecognized tag, otherwise as
/// [`parse_schema`].
pub fn parse_schema_tag(
    text: &str,
    name: &str,
    tag: &str,
    options: &ExtractOptions,
) -> Result<Schema> {
    let format: SchemaFormat = tag.parse()?;
    parse_schema(text, name, format, options)
}

/// Load a schema file, detecting its format when `format` is `None` and
/// falling back to XSD.
///
/// # Errors
///
/// See [`load_path_or`].
pub fn load_path(
    path: &Path,
    format: Option<SchemaFormat>,
    options: &ExtractOptions,
) -> Result<Schema> {
    load_path_or(path, format, SchemaFormat::Xsd, options)
}

/// Load a schema file named after its file stem.
///
/// Without an explicit `format` the content and extension are inspected,
/// with `fallback` when neither is conclusive. XSD imports available next to
/// the file are merged before extraction.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, otherwise as
/// [`parse_schema`].
pub fn load_path_or(
    path: &Path,
    format: Option<SchemaFormat>,
    fallback: SchemaFormat,
    options: &ExtractOptions,
) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io("read", path.display().to_string(), e.to_string()))?;
    let file_name = path.file_name().and_then(|n| n.to_str());
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("schema");

    let format = format.unwrap_or_else(|| detect_format_or(&text, file_name, fallback));
    debug!("Loading '{}' as {}", path.display(), format);

    let text = if format == SchemaFormat::Xsd {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        merge_imports(&text, &FileSystemSource::new(base_dir))
    } else {
        text
    };

    parse_schema(&text, name, format, options)
}

/// Append the rules of a Schematron document to `prior`, returning a new
/// schema with all element and class data unchanged.
///
/// # Errors
///
/// Returns [`Error::NoSchemaLoaded`] when there is no prior schema, or the
/// Schematron extractor's error.
pub fn merge_schematron(
    prior: Option<&Schema>,
    text: &str,
    options: &ExtractOptions,
) -> Result<Schema> {
    let prior = prior.ok_or(Error::NoSchemaLoaded)?;
    let rules = extract_rules(text, options)?;
    info!(
        "Merging {} Schematron rules into '{}' ({} existing)",
        rules.len(),
        prior.name,
        prior.schematron_rules.len()
    );
    Ok(prior.with_schematron_rules(rules))
}

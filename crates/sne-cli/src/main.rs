//! # sne
//!
//! Command-line interface for the Schema Normalization Engine.
//!
//! Loads an XSD, RelaxNG, TEI-ODD or Schematron file into the unified schema
//! graph and prints a summary, element details, Schematron rules, or the
//! JSON record form.

mod config;
mod report;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use config::{CliConfig, ConfigError};
use sne_model::{ExtractOptions, Schema, SchemaFormat};
use sne_pipeline::{load_path_or, merge_schematron};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sne")]
#[command(about = "Schema Normalization Engine CLI")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Preferred documentation language for ODD customizations
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Log extraction progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// How to load the schema file
#[derive(Args)]
struct SchemaArgs {
    /// Schema file path
    file: PathBuf,

    /// Source format (xsd, rng, odd, schematron); detected when omitted
    #[arg(short, long)]
    format: Option<SchemaFormat>,

    /// Schema name, defaults to the file stem
    #[arg(short, long)]
    name: Option<String>,

    /// Schematron files whose rules are merged into the schema
    #[arg(short, long)]
    schematron: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a schema and list its elements
    Inspect {
        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Show everything known about one element
    Element {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Element name
        element: String,
    },

    /// List Schematron rules
    Rules {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Only rules applicable to this element
        #[arg(short, long)]
        element: Option<String>,
    },

    /// Print the schema's JSON record form
    Export {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Indent the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// The requested element is not declared by the loaded schema
#[derive(Error, Debug)]
#[error("Element '{element}' not found in schema '{schema}'")]
struct UnknownElement {
    element: String,
    schema: String,
}

/// Exit status for a failure: 1 unknown element, 2 schema loading, 3
/// configuration, 4 anything else
fn exit_code(error: &anyhow::Error) -> u8 {
    if error.downcast_ref::<UnknownElement>().is_some() {
        1
    } else if error.downcast_ref::<sne_pipeline::Error>().is_some() {
        2
    } else if error.downcast_ref::<ConfigError>().is_some() {
        3
    } else {
        4
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let options = config.extract_options(cli.lang.as_deref());
    let fallback = config.fallback_format();
    debug!("Extraction options: {:?}, fallback format {}", options, fallback);

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Inspect { schema } => {
            let schema = load(&schema, fallback, &options)?;
            report::write_summary(&mut out, &schema).context("Failed to write output")?;
        }
        Commands::Element { schema, element } => {
            let schema = load(&schema, fallback, &options)?;
            let Some(found) = schema.element(&element) else {
                return Err(UnknownElement {
                    element,
                    schema: schema.name.clone(),
                }
                .into());
            };
            report::write_element(&mut out, &schema, found).context("Failed to write output")?;
        }
        Commands::Rules { schema, element } => {
            let schema = load(&schema, fallback, &options)?;
            match element {
                Some(element) => report::write_rules(&mut out, schema.rules_for_element(&element)),
                None => report::write_rules(&mut out, &schema.schematron_rules),
            }
            .context("Failed to write output")?;
        }
        Commands::Export { schema, pretty } => {
            let schema = load(&schema, fallback, &options)?;
            let json = schema.to_json(pretty).context("Failed to export schema")?;
            writeln!(out, "{json}").context("Failed to write output")?;
        }
    }
    out.flush().context("Failed to write output")?;
    Ok(())
}

/// Load the schema file, then merge each `--schematron` file in order
fn load(
    args: &SchemaArgs,
    fallback: SchemaFormat,
    options: &ExtractOptions,
) -> anyhow::Result<Schema> {
    let mut schema = load_path_or(&args.file, args.format, fallback, options)
        .context("Failed to load schema")?;
    if let Some(name) = &args.name {
        schema.name.clone_from(name);
    }

    for path in &args.schematron {
        schema = merge_rules_file(&schema, path, options).with_context(|| {
            format!("Failed to merge Schematron rules from '{}'", path.display())
        })?;
    }

    info!(
        "Loaded '{}' ({}): {} elements, {} rules",
        schema.name,
        schema.format,
        schema.element_names.len(),
        schema.schematron_rules.len()
    );
    Ok(schema)
}

fn merge_rules_file(
    schema: &Schema,
    path: &Path,
    options: &ExtractOptions,
) -> Result<Schema, sne_pipeline::Error> {
    let text = fs::read_to_string(path).map_err(|e| {
        sne_pipeline::Error::io("read", path.display().to_string(), e.to_string())
    })?;
    merge_schematron(Some(schema), &text, options)
}

use crate::config::Mode;
use crate::load_config::load_config;
use anyhow::{Context, Result};
use castdoc_core::contract::JsonSink;
use castdoc_core::{marshal_embedded, marshal_many, marshal_one, Document};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// CLI for castdoc: render records as JSON:API documents.
#[derive(Parser)]
#[clap(
    name = "castdoc",
    version,
    about = "Render podcast directory records as JSON:API resource documents"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the records in a JSON file with the schemas from the given config file
    Render {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Path to a JSON file holding one record or an array of records
        #[clap(long)]
        input: PathBuf,
        /// Name of the schema the top-level records follow
        #[clap(long)]
        schema: String,
        /// Document shape; defaults to the mode in the config file
        #[clap(long, value_enum)]
        mode: Option<Mode>,
        /// Pretty-print the document
        #[clap(long)]
        pretty: bool,
    },
}

/// CLI logic entrypoint for main(); writes the document to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    run_with_output(cli, stdout.lock())
}

/// Runs a parsed command, writing the rendered document to `out`.
pub fn run_with_output<W: Write>(cli: Cli, out: W) -> Result<()> {
    match cli.command {
        Commands::Render {
            config,
            input,
            schema,
            mode,
            pretty,
        } => {
            let config = load_config(config)?;
            let mode = mode.unwrap_or(config.mode);
            let pretty = pretty || config.pretty;

            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read input file {:?}", input))?;
            let records: Value = serde_json::from_str(&raw)
                .with_context(|| format!("Input file {:?} is not valid JSON", input))?;

            info!(?mode, schema = %schema, "Rendering document");
            let mut sink = JsonSink::new(out).pretty(pretty);
            let document = match mode {
                Mode::One => {
                    let resource = config.schemas.bind(&schema, single_record(&records, mode)?)?;
                    Document::from(marshal_one(&resource)?)
                }
                Mode::Many => {
                    let resources = config.schemas.bind_all(&schema, &records)?;
                    Document::from(marshal_many(&resources)?)
                }
                Mode::Embedded => {
                    let resource = config.schemas.bind(&schema, single_record(&records, mode)?)?;
                    marshal_embedded(&mut sink, &resource)?;
                    info!(?mode, "Render complete");
                    return Ok(());
                }
            };
            sink.encode(&document)?;
            info!(?mode, included = document.included().len(), "Render complete");
            Ok(())
        }
    }
}

fn single_record(records: &Value, mode: Mode) -> Result<&Value> {
    match records {
        Value::Array(items) => anyhow::bail!(
            "mode {:?} renders a single record, but the input holds an array of {}",
            mode,
            items.len()
        ),
        record => Ok(record),
    }
}

use crate::config::{Mode, RenderConfig};
use anyhow::{Context, Result};
use castdoc_core::schema::{FieldSpec, SchemaRegistry};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable overriding the configured default mode.
pub const MODE_ENV: &str = "CASTDOC_MODE";

#[derive(Deserialize)]
struct StaticConfig {
    #[serde(default)]
    mode: Mode,
    #[serde(default)]
    pretty: bool,
    schemas: IndexMap<String, Vec<FieldSpec>>,
}

/// Loads a YAML config file describing the resource schemas, applies the
/// `CASTDOC_MODE` override and compiles every schema.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {:?}", path_ref))?;

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let mode = match std::env::var(MODE_ENV) {
        Ok(var) => match Mode::from_str(&var, true) {
            Ok(mode) => {
                info!(?mode, "{} overrides configured mode", MODE_ENV);
                mode
            }
            Err(e) => {
                error!(error = %e, var = %var, "{} is not a valid mode", MODE_ENV);
                anyhow::bail!("{MODE_ENV} must be one of one, many, embedded: {e}");
            }
        },
        Err(_) => static_conf.mode,
    };

    let schemas = SchemaRegistry::compile(&static_conf.schemas)
        .map_err(|e| {
            error!(error = %e, "Failed to compile resource schemas");
            e
        })
        .context("Invalid resource schema in config")?;

    let config = RenderConfig {
        mode,
        pretty: static_conf.pretty,
        schemas,
    };
    config.trace_loaded();
    Ok(config)
}

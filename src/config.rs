// castdoc/src/config.rs

use castdoc_core::schema::SchemaRegistry;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which document entry point a render uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One primary resource, related resources side-loaded
    #[default]
    One,
    /// A collection of primary resources, related resources side-loaded
    Many,
    /// One primary resource with related resources nested in full
    Embedded,
}

#[derive(Debug)]
pub struct RenderConfig {
    pub mode: Mode,
    pub pretty: bool,
    pub schemas: SchemaRegistry,
}

impl RenderConfig {
    pub fn trace_loaded(&self) {
        info!(
            mode = ?self.mode,
            pretty = self.pretty,
            schemas = self.schemas.names().count(),
            "Loaded RenderConfig"
        );
        debug!(schemas = ?self.schemas.names().collect::<Vec<_>>(), "Schema names");
    }
}

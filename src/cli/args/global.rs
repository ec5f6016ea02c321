//! Global CLI options shared across all commands

use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; [`GlobalOptions::load_config`] lays it over the
/// config file.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (table, json)
    pub format: OutputFormat,

    /// Organization login override
    pub org: Option<String>,

    /// Custom config file path (defaults to ~/.gitmetrics/config.yaml)
    pub config: Option<String>,

    /// API base URL override
    pub endpoint: Option<String>,

    /// Access token override
    pub token: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            org: cli.org.clone(),
            config: cli.config.clone(),
            endpoint: cli.endpoint.clone(),
            token: cli.token.clone(),
        }
    }

    /// Load the config file (if any) and apply the overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref().map(Path::new))?;

        if let Some(org) = &self.org {
            config.org = Some(org.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }

        Ok(config)
    }
}

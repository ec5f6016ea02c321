//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, token validation, and client initialization.

use std::sync::Arc;

use log::{debug, info};

use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::GitHubClient;
use crate::config::Config;
use crate::error::Result;
use crate::scraper::{CancelHandle, CancelSignal, Scraper};

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// API client (Arc-wrapped so the scraper can share it across tasks)
    pub client: Arc<GitHubClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// This handles:
    /// - Loading config from path (or default location) and applying overrides
    /// - Validating the org and scrape settings
    /// - Validating the access token is present
    /// - Creating the API client
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or is incomplete.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = opts.load_config()?;
        config.validate()?;
        let token = config.token()?;

        debug!("Using endpoint {}", config.endpoint);
        let client = Arc::new(GitHubClient::new(&config.endpoint, token)?);

        Ok(Self {
            config,
            client,
            format: opts.format,
        })
    }

    /// Build a scraper over the context's client.
    pub fn scraper(&self) -> Result<Scraper<GitHubClient>> {
        Ok(Scraper::new(
            Arc::clone(&self.client),
            self.config.scraper_config()?,
        ))
    }
}

/// A cancel signal tripped by Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancelSignal {
    let (handle, signal) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling in-flight requests");
            handle.cancel();
        }
    });
    signal
}

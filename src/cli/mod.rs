//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod context;
pub mod metrics;
pub mod run;
pub mod scrape;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// gitmetrics - repository health metrics for a git hosting organization
#[derive(Parser, Debug)]
#[command(name = "gitmetrics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "GITMETRICS_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Organization (or user) login to scrape
    #[arg(long, global = true, env = "GITMETRICS_ORG", hide_env = true)]
    pub org: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "GITMETRICS_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// API base URL (GitHub Enterprise: https://<host>/api)
    #[arg(long, global = true, env = "GITMETRICS_ENDPOINT", hide_env = true)]
    pub endpoint: Option<String>,

    /// Access token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide = true)]
    pub token: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GITMETRICS_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scrape cycle and print the data points
    Scrape,

    /// Scrape repeatedly, writing data points as JSON lines
    #[command(after_help = "EXAMPLES:\n  \
            gitmetrics run --org liatrio                 # Every collection_interval_secs\n  \
            gitmetrics run --org liatrio --interval 300  # Every five minutes\n  \
            gitmetrics run --org liatrio --cycles 1      # Single cycle, JSON lines")]
    Run {
        /// Seconds between cycles (overrides collection_interval_secs)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<usize>,
    },

    /// List metrics and resource attributes with their enablement
    Metrics,
}

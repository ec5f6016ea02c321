//! gitmetrics CLI - repository health metrics for a git hosting organization

use clap::Parser;
use colored::Colorize;

use gitmetrics::cli::{self, Cli, Commands, GlobalOptions};
use gitmetrics::error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {}", "Error:".red(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Scrape => cli::scrape::run(&opts).await,
        Commands::Run { interval, cycles } => cli::run::run(&opts, interval, cycles).await,
        Commands::Metrics => cli::metrics::run(&opts),
    }
}

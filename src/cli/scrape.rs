//! One-shot scrape command

use colored::Colorize;

use crate::cli::context::cancel_on_ctrl_c;
use crate::cli::{CommandContext, GlobalOptions};
use crate::error::Result;
use crate::metrics::MemorySink;
use crate::output;

/// Run the scrape command
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let scraper = ctx.scraper()?;

    let sink = MemorySink::new();
    let summary = scraper.scrape_with_cancel(&sink, cancel_on_ctrl_c()).await?;
    let points = sink.take();

    for error in &summary.partial_errors {
        eprintln!("{} {}", "Warning:".yellow(), error);
    }

    println!("{}", output::render_scrape(&points, &summary, ctx.format)?);
    Ok(())
}

//! Continuous collection loop

use std::time::Duration;

use log::{error, info};

use crate::cli::context::cancel_on_ctrl_c;
use crate::cli::{CommandContext, GlobalOptions};
use crate::client::GitProviderApi;
use crate::error::{ConfigError, Result};
use crate::metrics::{JsonLinesSink, MetricSink};
use crate::scraper::{CancelSignal, Scraper};

/// Run the collection loop, writing data points to stdout as JSON lines.
///
/// A failed cycle is logged and the loop carries on with the next one.
pub async fn run(opts: &GlobalOptions, interval: Option<u64>, cycles: Option<usize>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let scraper = ctx.scraper()?;

    let interval = match interval {
        Some(0) => {
            return Err(ConfigError::Invalid("--interval must be at least 1".to_string()).into());
        }
        Some(secs) => Duration::from_secs(secs),
        None => ctx.config.collection_interval(),
    };

    let sink = JsonLinesSink::new(std::io::stdout());
    collect_loop(&scraper, &sink, interval, cycles, cancel_on_ctrl_c()).await;
    Ok(())
}

/// Scrape until `cycles` have run or `cancel` fires. Returns the cycles run.
async fn collect_loop<C: GitProviderApi + ?Sized>(
    scraper: &Scraper<C>,
    sink: &dyn MetricSink,
    interval: Duration,
    cycles: Option<usize>,
    cancel: CancelSignal,
) -> usize {
    let mut completed = 0;

    while cycles.is_none_or(|max| completed < max) {
        match scraper.scrape_with_cancel(sink, cancel.clone()).await {
            Ok(summary) => info!(
                "Cycle {} emitted {} data points ({} partial failures)",
                completed + 1,
                summary.data_points,
                summary.partial_errors.len()
            ),
            Err(err) => error!("Cycle {} failed: {}", completed + 1, err),
        }
        completed += 1;

        if cancel.is_cancelled() || cycles.is_some_and(|max| completed >= max) {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => break,
        }
    }

    completed
}

//! Metric catalog command

use crate::cli::GlobalOptions;
use crate::error::Result;
use crate::output;

/// Print every metric and resource attribute with its effective enablement.
///
/// Needs neither an org nor a token; only the config file is read.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let config = opts.load_config()?;
    println!("{}", output::render_catalog(&config.metrics, opts.format)?);
    Ok(())
}

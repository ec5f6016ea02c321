//! Output formatting for CLI results

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::metadata::MetricsBuilderConfig;
use crate::metrics::MetricDataPoint;
use crate::models::MetricRow;
use crate::scraper::ScrapeSummary;

pub mod formatters;
pub mod json;
pub mod table;

/// Render the data points of one scrape
pub fn render_scrape(
    points: &[MetricDataPoint],
    summary: &ScrapeSummary,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table::format_scrape_table(points, summary)),
        OutputFormat::Json => Ok(json::format_scrape_json(points, summary)?),
    }
}

/// Render the metric catalog with effective enablement
pub fn render_catalog(config: &MetricsBuilderConfig, format: OutputFormat) -> Result<String> {
    let rows = MetricRow::catalog(config);
    match format {
        OutputFormat::Table => Ok(table::format_table(&rows, "No metrics available.")),
        OutputFormat::Json => Ok(json::format_json(&rows)?),
    }
}

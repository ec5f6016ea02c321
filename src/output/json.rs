//! JSON output formatting

use chrono::Utc;
use serde::Serialize;

use crate::metrics::MetricDataPoint;
use crate::scraper::ScrapeSummary;

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the run
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// When the output was produced
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Scraped organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Repositories discovered by the scrape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<usize>,

    /// Isolated failures of the scrape
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partial_errors: Vec<String>,
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                organization: None,
                repositories: None,
                partial_errors: Vec::new(),
            },
        }
    }

    /// Attach the outcome of a scrape to the metadata
    pub fn with_summary(mut self, summary: &ScrapeSummary) -> Self {
        self.meta.organization = Some(summary.organization.login.clone());
        self.meta.repositories = Some(summary.repositories);
        self.meta.partial_errors = summary
            .partial_errors
            .iter()
            .map(ToString::to_string)
            .collect();
        self
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

/// Format the data points of a scrape as pretty-printed JSON
pub fn format_scrape_json(
    points: &[MetricDataPoint],
    summary: &ScrapeSummary,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(points).with_summary(summary))
}

//! Display model implementations for table and JSON output
//!
//! Display models transform data points and catalog entries into CLI-friendly
//! formats with appropriate column names and serialization.

use serde::Serialize;
use tabled::Tabled;

use crate::metadata::{Metric, MetricKind, MetricsBuilderConfig, ResourceAttribute};
use crate::metrics::MetricDataPoint;
use crate::output::formatters::format_duration;

/// Data point display model for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DataPointRow {
    /// Metric name
    #[tabled(rename = "METRIC")]
    pub metric: String,

    /// Data point attributes as `key=value` pairs
    #[tabled(rename = "ATTRIBUTES")]
    pub attributes: String,

    /// Value with unit
    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl From<&MetricDataPoint> for DataPointRow {
    fn from(point: &MetricDataPoint) -> Self {
        let value = match point.kind {
            MetricKind::Count => point.value.to_string(),
            MetricKind::Duration => format!("{} ({}s)", format_duration(point.value), point.value),
        };
        let attributes = point.attribute_summary();

        Self {
            metric: point.name.to_string(),
            attributes: if attributes.is_empty() {
                "-".to_string()
            } else {
                attributes
            },
            value,
        }
    }
}

/// Catalog entry display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MetricRow {
    /// Metric name or resource attribute key
    #[tabled(rename = "NAME")]
    pub name: String,

    /// `count`, `duration` or `resource`
    #[tabled(rename = "KIND")]
    pub kind: String,

    #[tabled(rename = "UNIT")]
    pub unit: String,

    /// Effective enablement
    #[tabled(rename = "ENABLED")]
    pub enabled: bool,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl MetricRow {
    /// Every metric, then every resource attribute, with effective enablement.
    pub fn catalog(config: &MetricsBuilderConfig) -> Vec<MetricRow> {
        let metrics = Metric::ALL.iter().map(|metric| MetricRow {
            name: metric.name().to_string(),
            kind: match metric.kind() {
                MetricKind::Count => "count",
                MetricKind::Duration => "duration",
            }
            .to_string(),
            unit: metric.unit().to_string(),
            enabled: config.metrics.is_enabled(*metric),
            description: metric.description().to_string(),
        });

        let attributes = ResourceAttribute::ALL.iter().map(|attribute| MetricRow {
            name: attribute.key().to_string(),
            kind: "resource".to_string(),
            unit: String::new(),
            enabled: config.resource_attributes.is_enabled(*attribute),
            description: match attribute {
                ResourceAttribute::VendorName => "Name of the git hosting provider",
                ResourceAttribute::OrganizationName => "Login of the scraped organization",
            }
            .to_string(),
        });

        metrics.chain(attributes).collect()
    }
}

//! Metric data points and their emission
//!
//! - [`MetricsBuilder`] records values for enabled metrics
//! - [`ResourceBuilder`] assembles the enabled resource attributes
//! - [`MetricSink`] receives finished data points

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metadata::{Metric, MetricKind};

pub mod builder;
pub mod sink;

pub use builder::{MetricsBuilder, ResourceBuilder};
pub use sink::{JsonLinesSink, MemorySink, MetricSink};

/// Data point attribute: repository name
pub const REPOSITORY_NAME: &str = "repository.name";
/// Data point attribute: branch name
pub const BRANCH_NAME: &str = "branch.name";
/// Data point attribute: advisory severity
pub const SEVERITY: &str = "severity";

/// Resource attributes shared by all data points of one scrape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResourceAttributes(BTreeMap<&'static str, String>);

impl ResourceAttributes {
    /// Value of an attribute, if it is present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub(crate) fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }
}

/// One emitted measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDataPoint {
    #[serde(skip)]
    pub metric: Metric,

    /// Metric name
    pub name: &'static str,

    /// Value kind
    pub kind: MetricKind,

    /// Unit of `value`
    pub unit: &'static str,

    /// Count, or duration in whole seconds
    pub value: i64,

    /// Data point attributes (repository, branch, severity)
    pub attributes: BTreeMap<&'static str, String>,

    /// Resource attributes of the scrape
    pub resource: ResourceAttributes,

    /// When the scraper started collecting
    pub start_time: DateTime<Utc>,

    /// When the value was observed
    pub time: DateTime<Utc>,
}

impl MetricDataPoint {
    /// Value of a data point attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Render the data point attributes as `key=value` pairs.
    pub fn attribute_summary(&self) -> String {
        self.attributes
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

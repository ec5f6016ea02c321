//! Metric and resource builders
//!
//! Values are recorded as they are computed and only turned into data points
//! on [`MetricsBuilder::emit`], once the resource attributes are known.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use super::{BRANCH_NAME, MetricDataPoint, REPOSITORY_NAME, ResourceAttributes, SEVERITY};
use crate::client::models::Severity;
use crate::metadata::{Metric, MetricsBuilderConfig, ResourceAttribute, ResourceAttributesConfig};

#[derive(Debug, Clone)]
struct Recorded {
    metric: Metric,
    value: i64,
    attributes: BTreeMap<&'static str, String>,
    time: DateTime<Utc>,
}

/// Records values for enabled metrics.
///
/// Recording a disabled metric is a no-op, so callers never need to check
/// enablement themselves.
#[derive(Debug)]
pub struct MetricsBuilder {
    config: MetricsBuilderConfig,
    start_time: DateTime<Utc>,
    recorded: Vec<Recorded>,
}

impl MetricsBuilder {
    pub fn new(config: MetricsBuilderConfig, start_time: DateTime<Utc>) -> Self {
        Self {
            config,
            start_time,
            recorded: Vec::new(),
        }
    }

    /// Enablement configuration in use.
    pub fn config(&self) -> &MetricsBuilderConfig {
        &self.config
    }

    /// Whether `metric` would be recorded.
    pub fn is_enabled(&self, metric: Metric) -> bool {
        self.config.metrics.is_enabled(metric)
    }

    /// Number of values waiting to be emitted.
    pub fn pending(&self) -> usize {
        self.recorded.len()
    }

    fn record(
        &mut self,
        metric: Metric,
        time: DateTime<Utc>,
        value: i64,
        attributes: &[(&'static str, &str)],
    ) {
        if !self.is_enabled(metric) {
            return;
        }
        self.recorded.push(Recorded {
            metric,
            value,
            attributes: attributes
                .iter()
                .map(|(k, v)| (*k, (*v).to_string()))
                .collect(),
            time,
        });
    }

    pub fn record_repository_count(&mut self, time: DateTime<Utc>, count: usize) {
        self.record(Metric::RepositoryCount, time, as_count(count), &[]);
    }

    pub fn record_branch_count(&mut self, time: DateTime<Utc>, count: usize, repository: &str) {
        self.record(
            Metric::BranchCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository)],
        );
    }

    pub fn record_branch_time(
        &mut self,
        time: DateTime<Utc>,
        age: Duration,
        repository: &str,
        branch: &str,
    ) {
        self.record(
            Metric::BranchTime,
            time,
            age.num_seconds(),
            &[(REPOSITORY_NAME, repository), (BRANCH_NAME, branch)],
        );
    }

    pub fn record_branch_ahead_by(
        &mut self,
        time: DateTime<Utc>,
        count: u64,
        repository: &str,
        branch: &str,
    ) {
        self.record(
            Metric::BranchAheadByCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository), (BRANCH_NAME, branch)],
        );
    }

    pub fn record_branch_behind_by(
        &mut self,
        time: DateTime<Utc>,
        count: u64,
        repository: &str,
        branch: &str,
    ) {
        self.record(
            Metric::BranchBehindByCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository), (BRANCH_NAME, branch)],
        );
    }

    pub fn record_branch_line_additions(
        &mut self,
        time: DateTime<Utc>,
        count: u64,
        repository: &str,
        branch: &str,
    ) {
        self.record(
            Metric::BranchLineAdditionCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository), (BRANCH_NAME, branch)],
        );
    }

    pub fn record_branch_line_deletions(
        &mut self,
        time: DateTime<Utc>,
        count: u64,
        repository: &str,
        branch: &str,
    ) {
        self.record(
            Metric::BranchLineDeletionCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository), (BRANCH_NAME, branch)],
        );
    }

    pub fn record_contributor_count(
        &mut self,
        time: DateTime<Utc>,
        count: usize,
        repository: &str,
    ) {
        self.record(
            Metric::ContributorCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository)],
        );
    }

    pub fn record_pull_request_time(
        &mut self,
        time: DateTime<Utc>,
        duration: Duration,
        repository: &str,
    ) {
        self.record(
            Metric::PullRequestTime,
            time,
            duration.num_seconds(),
            &[(REPOSITORY_NAME, repository)],
        );
    }

    pub fn record_pull_request_open_time(
        &mut self,
        time: DateTime<Utc>,
        age: Duration,
        repository: &str,
    ) {
        self.record(
            Metric::PullRequestOpenTime,
            time,
            age.num_seconds(),
            &[(REPOSITORY_NAME, repository)],
        );
    }

    pub fn record_cve_count(&mut self, time: DateTime<Utc>, count: usize, repository: &str) {
        self.record(
            Metric::CveCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository)],
        );
    }

    pub fn record_cve_severity_count(
        &mut self,
        time: DateTime<Utc>,
        count: usize,
        repository: &str,
        severity: Severity,
    ) {
        self.record(
            Metric::CveSeverityCount,
            time,
            as_count(count),
            &[(REPOSITORY_NAME, repository), (SEVERITY, severity.as_str())],
        );
    }

    pub fn record_organization_contributor_count(&mut self, time: DateTime<Utc>, count: usize) {
        self.record(
            Metric::OrganizationContributorCount,
            time,
            as_count(count),
            &[],
        );
    }

    /// Drain everything recorded so far into data points tagged with `resource`.
    pub fn emit(&mut self, resource: ResourceAttributes) -> Vec<MetricDataPoint> {
        let start_time = self.start_time;
        self.recorded
            .drain(..)
            .map(|r| MetricDataPoint {
                metric: r.metric,
                name: r.metric.name(),
                kind: r.metric.kind(),
                unit: r.metric.unit(),
                value: r.value,
                attributes: r.attributes,
                resource: resource.clone(),
                start_time,
                time: r.time,
            })
            .collect()
    }
}

fn as_count<N: TryInto<i64>>(n: N) -> i64 {
    n.try_into().unwrap_or(i64::MAX)
}

/// Collects resource attributes, dropping the disabled ones.
#[derive(Debug)]
pub struct ResourceBuilder {
    config: ResourceAttributesConfig,
    attributes: ResourceAttributes,
}

impl ResourceBuilder {
    pub fn new(config: ResourceAttributesConfig) -> Self {
        Self {
            config,
            attributes: ResourceAttributes::default(),
        }
    }

    fn set(&mut self, attribute: ResourceAttribute, value: &str) {
        if self.config.is_enabled(attribute) {
            self.attributes.insert(attribute.key(), value);
        }
    }

    pub fn set_vendor_name(&mut self, vendor: &str) {
        self.set(ResourceAttribute::VendorName, vendor);
    }

    pub fn set_organization_name(&mut self, organization: &str) {
        self.set(ResourceAttribute::OrganizationName, organization);
    }

    /// Take the collected attributes, leaving the builder empty.
    pub fn emit(&mut self) -> ResourceAttributes {
        std::mem::take(&mut self.attributes)
    }
}

//! Metric catalog and enablement configuration
//!
//! Every metric and resource attribute the scraper can produce is listed here
//! together with its default enablement. The configuration deserializes from
//! the `metrics` and `resource_attributes` sections of the config file, keyed by
//! metric name, so users only list the entries they want to change.

use serde::{Deserialize, Serialize};

/// Kind of value a metric carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Non-negative integer gauge
    Count,
    /// Duration gauge in seconds
    Duration,
}

/// Metrics the scraper knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    RepositoryCount,
    BranchCount,
    BranchTime,
    BranchAheadByCount,
    BranchBehindByCount,
    BranchLineAdditionCount,
    BranchLineDeletionCount,
    ContributorCount,
    PullRequestTime,
    PullRequestOpenTime,
    CveCount,
    CveSeverityCount,
    OrganizationContributorCount,
}

impl Metric {
    /// All metrics in catalog order.
    pub const ALL: [Metric; 13] = [
        Metric::BranchCount,
        Metric::BranchTime,
        Metric::ContributorCount,
        Metric::RepositoryCount,
        Metric::PullRequestTime,
        Metric::BranchAheadByCount,
        Metric::BranchBehindByCount,
        Metric::BranchLineAdditionCount,
        Metric::BranchLineDeletionCount,
        Metric::PullRequestOpenTime,
        Metric::CveCount,
        Metric::CveSeverityCount,
        Metric::OrganizationContributorCount,
    ];

    /// Stable metric name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::RepositoryCount => "repository.count",
            Metric::BranchCount => "repository.branch.count",
            Metric::BranchTime => "repository.branch.time",
            Metric::BranchAheadByCount => "repository.branch.commit.aheadby.count",
            Metric::BranchBehindByCount => "repository.branch.commit.behindby.count",
            Metric::BranchLineAdditionCount => "repository.branch.line.addition.count",
            Metric::BranchLineDeletionCount => "repository.branch.line.deletion.count",
            Metric::ContributorCount => "repository.contributor.count",
            Metric::PullRequestTime => "repository.pull_request.time",
            Metric::PullRequestOpenTime => "repository.pull_request.open.time",
            Metric::CveCount => "repository.cve.count",
            Metric::CveSeverityCount => "repository.cve.severity.count",
            Metric::OrganizationContributorCount => "organization.contributor.count",
        }
    }

    /// Value kind.
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::BranchTime | Metric::PullRequestTime | Metric::PullRequestOpenTime => {
                MetricKind::Duration
            }
            _ => MetricKind::Count,
        }
    }

    /// Unit in UCUM-style notation.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::RepositoryCount => "{repository}",
            Metric::BranchCount => "{branch}",
            Metric::BranchTime | Metric::PullRequestTime | Metric::PullRequestOpenTime => "s",
            Metric::BranchAheadByCount | Metric::BranchBehindByCount => "{commit}",
            Metric::BranchLineAdditionCount | Metric::BranchLineDeletionCount => "{line}",
            Metric::ContributorCount | Metric::OrganizationContributorCount => "{contributor}",
            Metric::CveCount | Metric::CveSeverityCount => "{cve}",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Metric::RepositoryCount => "Number of repositories in the organization",
            Metric::BranchCount => "Number of branches in a repository",
            Metric::BranchTime => "Time since the oldest unmerged commit of a stale branch",
            Metric::BranchAheadByCount => "Commits a branch is ahead of the default branch",
            Metric::BranchBehindByCount => "Commits a branch is behind the default branch",
            Metric::BranchLineAdditionCount => "Lines added by the commits unique to a branch",
            Metric::BranchLineDeletionCount => "Lines removed by the commits unique to a branch",
            Metric::ContributorCount => "Number of distinct contributors to a repository",
            Metric::PullRequestTime => "Time from creation to merge of a merged pull request",
            Metric::PullRequestOpenTime => "Age of an open pull request",
            Metric::CveCount => "Number of open vulnerability alerts in a repository",
            Metric::CveSeverityCount => "Number of open vulnerability alerts per severity",
            Metric::OrganizationContributorCount => {
                "Number of distinct contributors across the organization"
            }
        }
    }
}

/// Resource attributes attached to every data point of a scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceAttribute {
    VendorName,
    OrganizationName,
}

impl ResourceAttribute {
    pub const ALL: [ResourceAttribute; 2] =
        [ResourceAttribute::VendorName, ResourceAttribute::OrganizationName];

    /// Attribute key.
    pub fn key(&self) -> &'static str {
        match self {
            ResourceAttribute::VendorName => "vendor.name",
            ResourceAttribute::OrganizationName => "organization.name",
        }
    }
}

/// Enablement of a single metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub enabled: bool,
}

impl MetricConfig {
    const fn on() -> Self {
        Self { enabled: true }
    }

    const fn off() -> Self {
        Self { enabled: false }
    }
}

/// Enablement of every metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(rename = "repository.branch.count")]
    pub branch_count: MetricConfig,
    #[serde(rename = "repository.branch.time")]
    pub branch_time: MetricConfig,
    #[serde(rename = "repository.contributor.count")]
    pub contributor_count: MetricConfig,
    #[serde(rename = "repository.count")]
    pub repository_count: MetricConfig,
    #[serde(rename = "repository.pull_request.time")]
    pub pull_request_time: MetricConfig,
    #[serde(rename = "repository.branch.commit.aheadby.count")]
    pub branch_ahead_by_count: MetricConfig,
    #[serde(rename = "repository.branch.commit.behindby.count")]
    pub branch_behind_by_count: MetricConfig,
    #[serde(rename = "repository.branch.line.addition.count")]
    pub branch_line_addition_count: MetricConfig,
    #[serde(rename = "repository.branch.line.deletion.count")]
    pub branch_line_deletion_count: MetricConfig,
    #[serde(rename = "repository.pull_request.open.time")]
    pub pull_request_open_time: MetricConfig,
    #[serde(rename = "repository.cve.count")]
    pub cve_count: MetricConfig,
    #[serde(rename = "repository.cve.severity.count")]
    pub cve_severity_count: MetricConfig,
    #[serde(rename = "organization.contributor.count")]
    pub organization_contributor_count: MetricConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            branch_count: MetricConfig::on(),
            branch_time: MetricConfig::on(),
            contributor_count: MetricConfig::off(),
            repository_count: MetricConfig::on(),
            pull_request_time: MetricConfig::on(),
            branch_ahead_by_count: MetricConfig::off(),
            branch_behind_by_count: MetricConfig::off(),
            branch_line_addition_count: MetricConfig::off(),
            branch_line_deletion_count: MetricConfig::off(),
            pull_request_open_time: MetricConfig::off(),
            cve_count: MetricConfig::off(),
            cve_severity_count: MetricConfig::off(),
            organization_contributor_count: MetricConfig::off(),
        }
    }
}

impl MetricsConfig {
    fn entry(&self, metric: Metric) -> &MetricConfig {
        match metric {
            Metric::RepositoryCount => &self.repository_count,
            Metric::BranchCount => &self.branch_count,
            Metric::BranchTime => &self.branch_time,
            Metric::BranchAheadByCount => &self.branch_ahead_by_count,
            Metric::BranchBehindByCount => &self.branch_behind_by_count,
            Metric::BranchLineAdditionCount => &self.branch_line_addition_count,
            Metric::BranchLineDeletionCount => &self.branch_line_deletion_count,
            Metric::ContributorCount => &self.contributor_count,
            Metric::PullRequestTime => &self.pull_request_time,
            Metric::PullRequestOpenTime => &self.pull_request_open_time,
            Metric::CveCount => &self.cve_count,
            Metric::CveSeverityCount => &self.cve_severity_count,
            Metric::OrganizationContributorCount => &self.organization_contributor_count,
        }
    }

    fn entry_mut(&mut self, metric: Metric) -> &mut MetricConfig {
        match metric {
            Metric::RepositoryCount => &mut self.repository_count,
            Metric::BranchCount => &mut self.branch_count,
            Metric::BranchTime => &mut self.branch_time,
            Metric::BranchAheadByCount => &mut self.branch_ahead_by_count,
            Metric::BranchBehindByCount => &mut self.branch_behind_by_count,
            Metric::BranchLineAdditionCount => &mut self.branch_line_addition_count,
            Metric::BranchLineDeletionCount => &mut self.branch_line_deletion_count,
            Metric::ContributorCount => &mut self.contributor_count,
            Metric::PullRequestTime => &mut self.pull_request_time,
            Metric::PullRequestOpenTime => &mut self.pull_request_open_time,
            Metric::CveCount => &mut self.cve_count,
            Metric::CveSeverityCount => &mut self.cve_severity_count,
            Metric::OrganizationContributorCount => &mut self.organization_contributor_count,
        }
    }

    /// Whether `metric` is enabled.
    pub fn is_enabled(&self, metric: Metric) -> bool {
        self.entry(metric).enabled
    }

    /// Enable or disable `metric`.
    pub fn set_enabled(&mut self, metric: Metric, enabled: bool) {
        self.entry_mut(metric).enabled = enabled;
    }
}

/// Enablement of a single resource attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttributeConfig {
    pub enabled: bool,
}

/// Enablement of every resource attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceAttributesConfig {
    #[serde(rename = "vendor.name")]
    pub vendor_name: ResourceAttributeConfig,
    #[serde(rename = "organization.name")]
    pub organization_name: ResourceAttributeConfig,
}

impl Default for ResourceAttributesConfig {
    fn default() -> Self {
        Self {
            vendor_name: ResourceAttributeConfig { enabled: true },
            organization_name: ResourceAttributeConfig { enabled: true },
        }
    }
}

impl ResourceAttributesConfig {
    /// Whether `attribute` is enabled.
    pub fn is_enabled(&self, attribute: ResourceAttribute) -> bool {
        match attribute {
            ResourceAttribute::VendorName => self.vendor_name.enabled,
            ResourceAttribute::OrganizationName => self.organization_name.enabled,
        }
    }
}

/// Combined metric and resource attribute enablement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsBuilderConfig {
    pub metrics: MetricsConfig,
    pub resource_attributes: ResourceAttributesConfig,
}

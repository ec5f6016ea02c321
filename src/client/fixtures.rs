//! Test fixtures and builders for provider model types
//!
//! Provides builder patterns for creating test data with sensible defaults.
//! Import via `use crate::client::fixtures::*` in test modules.

use chrono::{DateTime, Duration, Utc};

use super::models::{
    Branch, Commit, Contributor, PullRequest, Repository, Severity, VulnerabilityAlert,
};

/// Fixed observation time so durations in tests are exact.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// `fixed_now()` minus the given number of hours.
pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    fixed_now() - Duration::hours(hours)
}

// ============================================================================
// RepositoryBuilder
// ============================================================================

/// Builder for creating test Repository instances.
///
/// # Example
/// ```ignore
/// let repo = RepositoryBuilder::new("repo1")
///     .default_branch("develop")
///     .build();
/// ```
pub struct RepositoryBuilder {
    id: String,
    name: String,
    default_branch: Option<String>,
}

impl RepositoryBuilder {
    /// Create a repository with a `main` default branch.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("R_{}", name),
            name,
            default_branch: Some("main".to_string()),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// Repository without any commits (no default branch).
    pub fn empty(mut self) -> Self {
        self.default_branch = None;
        self
    }

    pub fn build(self) -> Repository {
        Repository {
            id: self.id,
            name: self.name,
            default_branch: self.default_branch,
        }
    }
}

/// `repo1` .. `repo{count}`, each with a `main` default branch.
pub fn repositories(count: usize) -> Vec<Repository> {
    (1..=count)
        .map(|n| RepositoryBuilder::new(format!("repo{}", n)).build())
        .collect()
}

// ============================================================================
// BranchBuilder
// ============================================================================

/// Builder for creating test Branch instances.
///
/// # Example
/// ```ignore
/// let branch = BranchBuilder::new("feature").ahead_by(2).behind_by(5).build();
/// ```
pub struct BranchBuilder {
    name: String,
    ahead_by: u64,
    behind_by: u64,
}

impl BranchBuilder {
    /// Create a branch level with the default branch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ahead_by: 0,
            behind_by: 0,
        }
    }

    pub fn ahead_by(mut self, commits: u64) -> Self {
        self.ahead_by = commits;
        self
    }

    pub fn behind_by(mut self, commits: u64) -> Self {
        self.behind_by = commits;
        self
    }

    pub fn build(self) -> Branch {
        Branch {
            name: self.name,
            ahead_by: self.ahead_by,
            behind_by: self.behind_by,
        }
    }
}

/// The default branch as the provider reports it: level with itself.
pub fn default_branch(name: impl Into<String>) -> Branch {
    BranchBuilder::new(name).build()
}

// ============================================================================
// Commits
// ============================================================================

/// Commit made `hours` before `fixed_now()`.
pub fn commit(hours: i64, additions: u64, deletions: u64) -> Commit {
    Commit {
        committed_date: hours_ago(hours),
        additions,
        deletions,
    }
}

// ============================================================================
// PullRequestBuilder
// ============================================================================

/// Builder for creating test PullRequest instances.
///
/// # Example
/// ```ignore
/// let pr = PullRequestBuilder::opened(hours_ago(10))
///     .merged_at(hours_ago(4))
///     .build();
/// ```
pub struct PullRequestBuilder {
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    closed: bool,
}

impl PullRequestBuilder {
    /// Create an open pull request.
    pub fn opened(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            merged_at: None,
            closed: false,
        }
    }

    /// Mark as merged (and therefore closed) at `merged_at`.
    pub fn merged_at(mut self, merged_at: DateTime<Utc>) -> Self {
        self.merged_at = Some(merged_at);
        self.closed = true;
        self
    }

    /// Mark as closed without merging.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn build(self) -> PullRequest {
        PullRequest {
            created_at: self.created_at,
            merged: self.merged_at.is_some(),
            merged_at: self.merged_at,
            closed: self.closed,
        }
    }
}

// ============================================================================
// Contributors and alerts
// ============================================================================

pub fn contributor(id: u64) -> Contributor {
    Contributor {
        id,
        login: format!("user{}", id),
    }
}

/// Contributors with the given IDs, in order.
pub fn contributors(ids: &[u64]) -> Vec<Contributor> {
    ids.iter().copied().map(contributor).collect()
}

/// Alerts with the given severities, in order.
pub fn alerts(severities: &[Severity]) -> Vec<VulnerabilityAlert> {
    severities
        .iter()
        .enumerate()
        .map(|(i, severity)| VulnerabilityAlert {
            id: format!("RVA_{}", i + 1),
            severity: *severity,
        })
        .collect()
}

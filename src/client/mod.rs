//! Git provider API client

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(test)]
pub mod fixtures;
pub mod github;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod rate_limit;

pub use github::GitHubClient;
#[cfg(test)]
pub use mock::MockGitProviderClient;
use models::{
    Branch, Commit, Contributor, Organization, PullRequest, Repository, VulnerabilityAlert,
};
pub use pagination::{MAX_PAGE_SIZE, Page, PageInfo, PageRequest};

/// Paginated connections walked during a scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    Repositories,
    Branches,
    PullRequests,
    Contributors,
    VulnerabilityAlerts,
    CommitHistory,
}

impl Connection {
    /// Short name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Connection::Repositories => "repositories",
            Connection::Branches => "branches",
            Connection::PullRequests => "pull requests",
            Connection::Contributors => "contributors",
            Connection::VulnerabilityAlerts => "vulnerability alerts",
            Connection::CommitHistory => "commit history",
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query capability of a git hosting provider.
///
/// Each method fetches exactly one page of one connection. A request without
/// a cursor asks for the first page. Implementations do not retry; a returned
/// error is final for that call.
#[async_trait]
pub trait GitProviderApi: Send + Sync {
    /// Vendor name reported as a resource attribute.
    fn vendor_name(&self) -> &'static str;

    /// Resolve a login to an organization (or user) identity.
    ///
    /// Returns `Ok(None)` when the login does not exist.
    async fn resolve_owner(&self, login: &str) -> Result<Option<Organization>>;

    /// Search repositories matching `query`.
    async fn search_repositories(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> Result<Page<Repository>>;

    /// List branches with their divergence from `default_branch`.
    async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        default_branch: &str,
        request: &PageRequest,
    ) -> Result<Page<Branch>>;

    /// List pull requests of a repository.
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<PullRequest>>;

    /// List contributors of a repository.
    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<Contributor>>;

    /// List open dependency vulnerability alerts of a repository.
    async fn list_vulnerability_alerts(
        &self,
        owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<VulnerabilityAlert>>;

    /// Walk the commit history of `branch`, newest first.
    async fn commit_history(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        request: &PageRequest,
    ) -> Result<Page<Commit>>;
}

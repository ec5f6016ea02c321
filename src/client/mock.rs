//! Mock git provider client for testing
//!
//! Provides a scripted implementation of [`GitProviderApi`] for unit testing
//! without making real API calls. Connections are served from in-memory
//! collections and paginated with `cursor-<offset>` cursors, so any page size
//! walks the same data.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::{
    Branch, Commit, Contributor, Organization, OwnerKind, PullRequest, Repository,
    VulnerabilityAlert,
};
use super::pagination::{Page, PageRequest};
use super::{Connection, GitProviderApi};
use crate::error::{ApiError, Result};

/// Mock provider client for testing.
///
/// Configure responses via builder methods, then hand it to a scraper.
///
/// # Example
/// ```ignore
/// let mock = MockGitProviderClient::new()
///     .with_org("liatrio")
///     .await
///     .with_repositories(fixtures::repositories(2))
///     .await;
/// ```
#[derive(Default)]
pub struct MockGitProviderClient {
    /// Logins that resolve, keyed by login
    owners: Arc<Mutex<HashMap<String, Organization>>>,
    /// Repositories returned from the search
    repositories: Arc<Mutex<Vec<Repository>>>,
    /// Branches keyed by repository name
    branches: Arc<Mutex<HashMap<String, Vec<Branch>>>>,
    /// Pull requests keyed by repository name
    pull_requests: Arc<Mutex<HashMap<String, Vec<PullRequest>>>>,
    /// Contributors keyed by repository name
    contributors: Arc<Mutex<HashMap<String, Vec<Contributor>>>>,
    /// Vulnerability alerts keyed by repository name
    alerts: Arc<Mutex<HashMap<String, Vec<VulnerabilityAlert>>>>,
    /// Commit history (newest first) keyed by repository and branch name
    commits: Arc<Mutex<HashMap<(String, String), Vec<Commit>>>>,
    /// Error for the next owner lookup - consumed on first use
    owner_error: Arc<Mutex<Option<ApiError>>>,
    /// Errors for matching connection calls - each consumed on first use
    errors: Arc<Mutex<Vec<InjectedError>>>,
    /// Connections whose pages keep pointing back at the requested cursor
    stuck: Arc<Mutex<Vec<Connection>>>,
    /// Latency added to every call
    delay: Arc<Mutex<Option<Duration>>>,
    /// Latency added to calls for one repository
    repo_delays: Arc<Mutex<HashMap<String, Duration>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured requests for test assertions
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub resolve_owner: usize,
    pub search_repositories: usize,
    pub list_branches: usize,
    pub list_pull_requests: usize,
    pub list_contributors: usize,
    pub list_vulnerability_alerts: usize,
    pub commit_history: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.resolve_owner
            + self.search_repositories
            + self.list_branches
            + self.list_pull_requests
            + self.list_contributors
            + self.list_vulnerability_alerts
            + self.commit_history
    }
}

/// A captured page request for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Connection being walked
    pub connection: Connection,
    /// Repository name, for per-repository connections
    pub repository: Option<String>,
    /// Branch name, for commit history
    pub branch: Option<String>,
    /// Search expression, for repository search
    pub query: Option<String>,
    /// Cursor sent with the request
    pub cursor: Option<String>,
    /// Requested page size
    pub page_size: usize,
}

struct InjectedError {
    connection: Connection,
    /// `None` matches any repository
    repository: Option<String>,
    /// `None` matches any cursor
    cursor: Option<String>,
    error: ApiError,
}

impl InjectedError {
    fn matches(&self, request: &CapturedRequest) -> bool {
        self.connection == request.connection
            && self
                .repository
                .as_ref()
                .is_none_or(|r| request.repository.as_ref() == Some(r))
            && self
                .cursor
                .as_ref()
                .is_none_or(|c| request.cursor.as_ref() == Some(c))
    }
}

/// Decrements the in-flight counter when a call ends (or is dropped).
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockGitProviderClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `login` resolve to an organization.
    pub async fn with_org(self, login: &str) -> Self {
        self.owners.lock().await.insert(
            login.to_string(),
            Organization {
                login: login.to_string(),
                kind: OwnerKind::Organization,
            },
        );
        self
    }

    /// Make `login` resolve to a user account.
    pub async fn with_user(self, login: &str) -> Self {
        self.owners.lock().await.insert(
            login.to_string(),
            Organization {
                login: login.to_string(),
                kind: OwnerKind::User,
            },
        );
        self
    }

    /// Configure repositories returned from the search.
    pub async fn with_repositories(self, repositories: Vec<Repository>) -> Self {
        *self.repositories.lock().await = repositories;
        self
    }

    /// Configure branches of `repo`.
    pub async fn with_branches(self, repo: &str, branches: Vec<Branch>) -> Self {
        self.branches
            .lock()
            .await
            .insert(repo.to_string(), branches);
        self
    }

    /// Configure pull requests of `repo`.
    pub async fn with_pull_requests(self, repo: &str, pull_requests: Vec<PullRequest>) -> Self {
        self.pull_requests
            .lock()
            .await
            .insert(repo.to_string(), pull_requests);
        self
    }

    /// Configure contributors of `repo`.
    pub async fn with_contributors(self, repo: &str, contributors: Vec<Contributor>) -> Self {
        self.contributors
            .lock()
            .await
            .insert(repo.to_string(), contributors);
        self
    }

    /// Configure vulnerability alerts of `repo`.
    pub async fn with_alerts(self, repo: &str, alerts: Vec<VulnerabilityAlert>) -> Self {
        self.alerts.lock().await.insert(repo.to_string(), alerts);
        self
    }

    /// Configure the commit history of `branch` in `repo`, newest first.
    pub async fn with_commits(self, repo: &str, branch: &str, commits: Vec<Commit>) -> Self {
        self.commits
            .lock()
            .await
            .insert((repo.to_string(), branch.to_string()), commits);
        self
    }

    /// Configure an error for the next owner lookup.
    /// The error is consumed after one use.
    pub async fn with_owner_error(self, error: ApiError) -> Self {
        *self.owner_error.lock().await = Some(error);
        self
    }

    /// Configure an error for the next call on `connection`, optionally
    /// restricted to one repository. The error is consumed after one use.
    pub async fn with_error(
        self,
        connection: Connection,
        repo: Option<&str>,
        error: ApiError,
    ) -> Self {
        self.errors.lock().await.push(InjectedError {
            connection,
            repository: repo.map(str::to_string),
            cursor: None,
            error,
        });
        self
    }

    /// Configure an error for the call on `connection` of `repo` that carries
    /// `cursor`. The error is consumed after one use.
    pub async fn with_error_at(
        self,
        connection: Connection,
        repo: &str,
        cursor: &str,
        error: ApiError,
    ) -> Self {
        self.errors.lock().await.push(InjectedError {
            connection,
            repository: Some(repo.to_string()),
            cursor: Some(cursor.to_string()),
            error,
        });
        self
    }

    /// Make every page of `connection` claim a successor at the cursor it
    /// was requested with (`cursor-0` for the first page).
    pub async fn with_stuck_cursor(self, connection: Connection) -> Self {
        self.stuck.lock().await.push(connection);
        self
    }

    /// Add latency to every call.
    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Add latency to every call concerning `repo`.
    pub async fn with_repo_delay(self, repo: &str, delay: Duration) -> Self {
        self.repo_delays
            .lock()
            .await
            .insert(repo.to_string(), delay);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all captured requests for test assertions.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    /// Search expressions sent to the repository search, in call order.
    pub async fn search_queries(&self) -> Vec<String> {
        self.captured_requests
            .lock()
            .await
            .iter()
            .filter_map(|r| r.query.clone())
            .collect()
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        InFlight(self.in_flight.clone())
    }

    async fn sleep_for(&self, repository: Option<&str>) {
        let delay = *self.delay.lock().await;
        let repo_delay = match repository {
            Some(repo) => self.repo_delays.lock().await.get(repo).copied(),
            None => None,
        };
        if let Some(delay) = delay.into_iter().chain(repo_delay).max() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Serve a page of `items` for `connection`.
    async fn serve<T: Clone>(
        &self,
        connection: Connection,
        items: &[T],
        request: &PageRequest,
    ) -> Result<Page<T>> {
        if self.stuck.lock().await.contains(&connection) {
            let cursor = request.cursor.as_deref().unwrap_or("cursor-0");
            let nodes = items.iter().take(request.page_size).cloned().collect();
            return Ok(Page::with_next(nodes, cursor));
        }
        paginate(items, request)
    }

    /// Record the request, then fail or stall it as configured.
    async fn begin(&self, request: CapturedRequest) -> Result<InFlight> {
        let guard = self.enter();

        {
            let mut counts = self.call_count.lock().await;
            match request.connection {
                Connection::Repositories => counts.search_repositories += 1,
                Connection::Branches => counts.list_branches += 1,
                Connection::PullRequests => counts.list_pull_requests += 1,
                Connection::Contributors => counts.list_contributors += 1,
                Connection::VulnerabilityAlerts => counts.list_vulnerability_alerts += 1,
                Connection::CommitHistory => counts.commit_history += 1,
            }
        }

        self.sleep_for(request.repository.as_deref()).await;

        let injected = {
            let mut errors = self.errors.lock().await;
            errors
                .iter()
                .position(|e| e.matches(&request))
                .map(|idx| errors.remove(idx))
        };
        self.captured_requests.lock().await.push(request);

        match injected {
            Some(injected) => Err(injected.error.into()),
            None => Ok(guard),
        }
    }
}

fn per_repo(
    connection: Connection,
    repo: &str,
    branch: Option<&str>,
    request: &PageRequest,
) -> CapturedRequest {
    CapturedRequest {
        connection,
        repository: Some(repo.to_string()),
        branch: branch.map(str::to_string),
        query: None,
        cursor: request.cursor.clone(),
        page_size: request.page_size,
    }
}

/// Serve one page of `items`; cursors are `cursor-<offset>`.
fn paginate<T: Clone>(items: &[T], request: &PageRequest) -> Result<Page<T>> {
    let start = match request.cursor.as_deref() {
        None => 0,
        Some(cursor) => cursor
            .strip_prefix("cursor-")
            .and_then(|offset| offset.parse::<usize>().ok())
            .ok_or_else(|| ApiError::BadRequest(format!("unknown cursor {}", cursor)))?,
    };
    let end = (start + request.page_size).min(items.len());
    let nodes = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    if end < items.len() {
        Ok(Page::with_next(nodes, format!("cursor-{}", end)))
    } else {
        Ok(Page::last(nodes))
    }
}

// ============================================================================
// GitProviderApi Implementation
// ============================================================================

#[async_trait]
impl GitProviderApi for MockGitProviderClient {
    fn vendor_name(&self) -> &'static str {
        "github"
    }

    async fn resolve_owner(&self, login: &str) -> Result<Option<Organization>> {
        let _guard = self.enter();
        self.call_count.lock().await.resolve_owner += 1;
        self.sleep_for(None).await;

        if let Some(error) = self.owner_error.lock().await.take() {
            return Err(error.into());
        }
        Ok(self.owners.lock().await.get(login).cloned())
    }

    async fn search_repositories(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> Result<Page<Repository>> {
        let _guard = self
            .begin(CapturedRequest {
                connection: Connection::Repositories,
                repository: None,
                branch: None,
                query: Some(query.to_string()),
                cursor: request.cursor.clone(),
                page_size: request.page_size,
            })
            .await?;

        let repositories = self.repositories.lock().await.clone();
        self.serve(Connection::Repositories, &repositories, request).await
    }

    async fn list_branches(
        &self,
        _owner: &str,
        repo: &str,
        _default_branch: &str,
        request: &PageRequest,
    ) -> Result<Page<Branch>> {
        let _guard = self
            .begin(per_repo(Connection::Branches, repo, None, request))
            .await?;

        let branches = self.branches.lock().await.get(repo).cloned();
        self.serve(Connection::Branches, &branches.unwrap_or_default(), request)
            .await
    }

    async fn list_pull_requests(
        &self,
        _owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<PullRequest>> {
        let _guard = self
            .begin(per_repo(Connection::PullRequests, repo, None, request))
            .await?;

        let pull_requests = self.pull_requests.lock().await.get(repo).cloned();
        self.serve(Connection::PullRequests, &pull_requests.unwrap_or_default(), request)
            .await
    }

    async fn list_contributors(
        &self,
        _owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<Contributor>> {
        let _guard = self
            .begin(per_repo(Connection::Contributors, repo, None, request))
            .await?;

        let contributors = self.contributors.lock().await.get(repo).cloned();
        self.serve(Connection::Contributors, &contributors.unwrap_or_default(), request)
            .await
    }

    async fn list_vulnerability_alerts(
        &self,
        _owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<VulnerabilityAlert>> {
        let _guard = self
            .begin(per_repo(Connection::VulnerabilityAlerts, repo, None, request))
            .await?;

        let alerts = self.alerts.lock().await.get(repo).cloned();
        self.serve(Connection::VulnerabilityAlerts, &alerts.unwrap_or_default(), request)
            .await
    }

    async fn commit_history(
        &self,
        _owner: &str,
        repo: &str,
        branch: &str,
        request: &PageRequest,
    ) -> Result<Page<Commit>> {
        let _guard = self
            .begin(per_repo(
                Connection::CommitHistory,
                repo,
                Some(branch),
                request,
            ))
            .await?;

        let key = (repo.to_string(), branch.to_string());
        let commits = self.commits.lock().await.get(&key).cloned();
        self.serve(Connection::CommitHistory, &commits.unwrap_or_default(), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{BranchBuilder, repositories};

    #[tokio::test]
    async fn test_mock_paginates_with_offset_cursors() {
        let mock = MockGitProviderClient::new()
            .with_repositories(repositories(5))
            .await;

        let first = mock
            .search_repositories("org:liatrio", &PageRequest::first(2))
            .await
            .unwrap();
        assert_eq!(first.nodes.len(), 2);
        assert_eq!(first.page_info.end_cursor.as_deref(), Some("cursor-2"));

        let last = mock
            .search_repositories("org:liatrio", &PageRequest::first(2).after("cursor-4"))
            .await
            .unwrap();
        assert_eq!(last.nodes.len(), 1);
        assert!(!last.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_mock_unknown_cursor_is_bad_request() {
        let mock = MockGitProviderClient::new();
        let result = mock
            .search_repositories("org:liatrio", &PageRequest::first(2).after("bogus"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_error_is_consumed_once() {
        let mock = MockGitProviderClient::new()
            .with_branches("repo1", vec![BranchBuilder::new("main").build()])
            .await
            .with_error(
                Connection::Branches,
                Some("repo1"),
                ApiError::ServerError("boom".to_string()),
            )
            .await;
        let request = PageRequest::first(10);

        assert!(
            mock.list_branches("liatrio", "repo2", "main", &request)
                .await
                .is_ok()
        );
        assert!(
            mock.list_branches("liatrio", "repo1", "main", &request)
                .await
                .is_err()
        );
        assert!(
            mock.list_branches("liatrio", "repo1", "main", &request)
                .await
                .is_ok()
        );

        let counts = mock.call_counts().await;
        assert_eq!(counts.list_branches, 3);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_mock_captures_requests() {
        let mock = MockGitProviderClient::new();
        mock.commit_history("liatrio", "repo1", "feature", &PageRequest::first(3))
            .await
            .unwrap();

        let captured = mock.captured_requests().await;
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].connection, Connection::CommitHistory);
        assert_eq!(captured[0].branch.as_deref(), Some("feature"));
        assert_eq!(captured[0].page_size, 3);
        assert_eq!(mock.max_in_flight(), 1);
    }
}

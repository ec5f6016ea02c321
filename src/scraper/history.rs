//! Branch staleness from commit history
//!
//! Only branches that have fallen behind the default branch are resolved.
//! For those, the commits unique to the branch (or the head commit alone when
//! nothing is unique) form the window that staleness and line counts are
//! computed over.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::context::ScrapeContext;
use super::parallel::run_ordered;
use super::paginate::invalid_cursor;
use crate::client::models::{Branch, Commit, Repository};
use crate::client::{Connection, GitProviderApi, PageRequest};
use crate::error::ScrapeError;

/// Summary of a branch's history window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchHistory {
    /// Commits in the window
    pub commits: usize,
    /// Commit date of the oldest commit in the window
    pub oldest_commit: Option<DateTime<Utc>>,
    /// Lines added across the window
    pub additions: u64,
    /// Lines removed across the window
    pub deletions: u64,
}

impl BranchHistory {
    pub fn from_commits(commits: &[Commit]) -> Self {
        Self {
            commits: commits.len(),
            oldest_commit: commits.iter().map(|c| c.committed_date).min(),
            additions: commits.iter().map(|c| c.additions).sum(),
            deletions: commits.iter().map(|c| c.deletions).sum(),
        }
    }

    /// Age of the oldest commit at `now`, `None` without commits.
    pub fn staleness(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.oldest_commit.map(|oldest| now - oldest)
    }
}

/// A branch together with its resolved history
#[derive(Debug, Clone)]
pub struct BranchReport {
    pub branch: Branch,
    /// `None` for branches that are not stale and were never resolved
    pub history: Option<Result<BranchHistory, ScrapeError>>,
}

impl BranchReport {
    /// History of a resolved branch, if resolution succeeded.
    pub fn resolved(&self) -> Option<&BranchHistory> {
        match &self.history {
            Some(Ok(history)) => Some(history),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ScrapeError> {
        match &self.history {
            Some(Err(err)) => Some(err),
            _ => None,
        }
    }
}

/// Whether `branch` needs its history resolved.
///
/// The default branch and branches level with it are never stale.
pub fn needs_history(branch: &Branch, default_branch: Option<&str>) -> bool {
    branch.is_behind() && default_branch != Some(branch.name.as_str())
}

/// Number of commits from the branch head that make up the window.
pub fn window_size(branch: &Branch) -> usize {
    usize::try_from(branch.ahead_by.max(1)).unwrap_or(usize::MAX)
}

/// Fetch the history window of one branch.
pub async fn resolve_branch<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: &str,
    branch: &Branch,
) -> Result<BranchHistory, ScrapeError>
where
    C: GitProviderApi + ?Sized,
{
    let scope = format!("{}@{}", repository, branch.name);
    let window = window_size(branch);
    let mut commits: Vec<Commit> = Vec::new();
    let mut request = PageRequest::first(window.min(ctx.page_size));

    loop {
        let cursor = request.cursor.clone();
        let page = ctx
            .call(client.commit_history(owner, repository, &branch.name, &request))
            .await
            .map_err(|f| f.into_scrape_error(&scope, Connection::CommitHistory, cursor))?;

        let next = page.next_request(&request);
        let progressed = !page.nodes.is_empty();
        commits.extend(page.nodes);

        if commits.len() >= window {
            commits.truncate(window);
            break;
        }
        match next {
            // an empty page cannot fill the window
            Ok(Some(_)) if !progressed => break,
            Ok(Some(next)) => {
                let remaining = window - commits.len();
                request = next.page_size(remaining.min(ctx.page_size));
            }
            Ok(None) => break,
            Err(()) => {
                return Err(invalid_cursor(
                    &scope,
                    Connection::CommitHistory,
                    request.cursor.clone(),
                ));
            }
        }
    }

    let history = BranchHistory::from_commits(&commits);
    if history.commits == 0 {
        debug!("Branch {} has no commits; no staleness recorded", scope);
    }
    Ok(history)
}

/// Resolve every stale branch of `repository`, keeping branch order.
pub async fn resolve_branches<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: &Repository,
    branches: Vec<Branch>,
) -> Vec<BranchReport>
where
    C: GitProviderApi + ?Sized,
{
    let default_branch = repository.default_branch.as_deref();

    run_ordered(
        branches,
        |branch| async move {
            let history = if needs_history(&branch, default_branch) {
                Some(resolve_branch(client, ctx, owner, &repository.name, &branch).await)
            } else {
                None
            };
            BranchReport { branch, history }
        },
        ctx.concurrency,
    )
    .await
}

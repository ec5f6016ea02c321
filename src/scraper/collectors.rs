//! Per-repository collectors
//!
//! Four independent collectors walk the branches, pull requests, contributors
//! and vulnerability alerts of one repository. They run concurrently, and a
//! failure in one never affects the others.

use std::collections::HashSet;

use super::context::ScrapeContext;
use super::history::{BranchReport, resolve_branches};
use super::paginate::{Collected, collect_pages};
use crate::client::models::{Contributor, PullRequest, Repository, VulnerabilityAlert};
use crate::client::{Connection, GitProviderApi};
use crate::error::ScrapeError;

/// Everything collected for one repository
#[derive(Debug, Clone)]
pub struct RepositoryReport {
    pub repository: Repository,
    pub branches: Collected<BranchReport>,
    pub pull_requests: Collected<PullRequest>,
    /// Distinct contributors, first occurrence order
    pub contributors: Collected<Contributor>,
    pub alerts: Collected<VulnerabilityAlert>,
}

impl RepositoryReport {
    /// Every isolated failure of this repository, collectors first, then
    /// branch histories in branch order.
    pub fn errors(&self) -> Vec<&ScrapeError> {
        let collectors = [
            self.branches.error.as_ref(),
            self.pull_requests.error.as_ref(),
            self.contributors.error.as_ref(),
            self.alerts.error.as_ref(),
        ];
        collectors
            .into_iter()
            .flatten()
            .chain(self.branches.items.iter().filter_map(BranchReport::error))
            .collect()
    }
}

/// Run all collectors for `repository`.
pub async fn collect_repository<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: Repository,
) -> RepositoryReport
where
    C: GitProviderApi + ?Sized,
{
    let (branches, pull_requests, contributors, alerts) = futures::join!(
        collect_branches(client, ctx, owner, &repository),
        collect_pull_requests(client, ctx, owner, &repository),
        collect_contributors(client, ctx, owner, &repository),
        collect_alerts(client, ctx, owner, &repository),
    );

    RepositoryReport {
        repository,
        branches,
        pull_requests,
        contributors,
        alerts,
    }
}

/// Branches with their divergence, then the history of every stale branch.
///
/// A repository without a default branch has no commits and so no branches.
pub async fn collect_branches<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: &Repository,
) -> Collected<BranchReport>
where
    C: GitProviderApi + ?Sized,
{
    let Some(default_branch) = repository.default_branch.as_deref() else {
        return Collected::default();
    };
    let name = repository.name.as_str();

    let branches = collect_pages(ctx, Connection::Branches, name, |request| async move {
        client
            .list_branches(owner, name, default_branch, &request)
            .await
    })
    .await;

    let Collected { items, error } = branches;
    let reports = resolve_branches(client, ctx, owner, repository, items).await;
    Collected {
        items: reports,
        error,
    }
}

pub async fn collect_pull_requests<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: &Repository,
) -> Collected<PullRequest>
where
    C: GitProviderApi + ?Sized,
{
    let name = repository.name.as_str();
    collect_pages(ctx, Connection::PullRequests, name, |request| async move {
        client.list_pull_requests(owner, name, &request).await
    })
    .await
}

/// Contributors deduplicated by ID, also registered in the cycle-wide set.
pub async fn collect_contributors<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: &Repository,
) -> Collected<Contributor>
where
    C: GitProviderApi + ?Sized,
{
    let name = repository.name.as_str();
    let collected = collect_pages(ctx, Connection::Contributors, name, |request| async move {
        client.list_contributors(owner, name, &request).await
    })
    .await;

    let mut seen = HashSet::new();
    let collected = collected.map(|items| {
        items
            .into_iter()
            .filter(|c| seen.insert(c.id))
            .collect()
    });
    for contributor in &collected.items {
        ctx.contributors.insert(contributor.id).await;
    }
    collected
}

pub async fn collect_alerts<C>(
    client: &C,
    ctx: &ScrapeContext,
    owner: &str,
    repository: &Repository,
) -> Collected<VulnerabilityAlert>
where
    C: GitProviderApi + ?Sized,
{
    let name = repository.name.as_str();
    collect_pages(
        ctx,
        Connection::VulnerabilityAlerts,
        name,
        |request| async move {
            client
                .list_vulnerability_alerts(owner, name, &request)
                .await
        },
    )
    .await
}

//! Repository discovery

use log::info;

use super::context::ScrapeContext;
use super::paginate::collect_pages;
use crate::client::models::Repository;
use crate::client::{Connection, GitProviderApi};
use crate::error::ScrapeError;

/// List every repository matching `query`, in API order.
///
/// Unlike the per-repository collectors, a failed page fails the whole
/// listing: a partial repository list would silently shrink every metric.
pub async fn list_repositories<C>(
    client: &C,
    ctx: &ScrapeContext,
    query: &str,
) -> Result<Vec<Repository>, ScrapeError>
where
    C: GitProviderApi + ?Sized,
{
    let collected = collect_pages(ctx, Connection::Repositories, query, |request| async move {
        client.search_repositories(query, &request).await
    })
    .await;

    if let Some(error) = collected.error {
        return Err(ScrapeError::RepositoryList(error.to_string()));
    }

    info!(
        "Found {} repositories for `{}`",
        collected.items.len(),
        query
    );
    Ok(collected.items)
}

//! Cursor pagination over a single connection
//!
//! Every collector walks its connection the same way: request the first page
//! without a cursor, append the nodes, and follow `end_cursor` while the API
//! reports another page. A failing page stops the walk and keeps what was
//! merged so far.

use std::collections::HashSet;
use std::future::Future;

use log::debug;

use super::context::ScrapeContext;
use crate::client::{Connection, Page, PageRequest};
use crate::error::{Result, ScrapeError};

/// Items merged from a connection, plus the error that cut the walk short
#[derive(Debug, Clone)]
pub struct Collected<T> {
    /// Nodes in API order
    pub items: Vec<T>,
    /// Set when the connection was not walked to its end
    pub error: Option<ScrapeError>,
}

impl<T> Collected<T> {
    /// A fully walked connection.
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    /// A connection that stopped early with `error`.
    pub fn partial(items: Vec<T>, error: ScrapeError) -> Self {
        Self {
            items,
            error: Some(error),
        }
    }

    /// Whether some pages are missing.
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }

    /// Item count, only when the connection is complete.
    pub fn complete_len(&self) -> Option<usize> {
        if self.is_partial() {
            None
        } else {
            Some(self.items.len())
        }
    }

    /// Transform the items, keeping the error.
    pub fn map<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> Collected<U> {
        Collected {
            items: f(self.items),
            error: self.error,
        }
    }
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}

/// Error for a page that claims a successor without a usable cursor.
pub(crate) fn invalid_cursor(
    scope: &str,
    connection: Connection,
    cursor: Option<String>,
) -> ScrapeError {
    ScrapeError::SubResourceFetch {
        repository: scope.to_string(),
        connection,
        cursor,
        message: "Invalid API response: page reports more results but no new end cursor"
            .to_string(),
    }
}

/// Walk `connection` to its end.
///
/// `scope` names what is being walked (the repository name, or the search
/// expression for repositories) and ends up in the error on failure.
pub async fn collect_pages<T, F, Fut>(
    ctx: &ScrapeContext,
    connection: Connection,
    scope: &str,
    mut fetch: F,
) -> Collected<T>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest::first(ctx.page_size);
    let mut pages = 0usize;
    let mut visited: HashSet<String> = HashSet::new();

    loop {
        let cursor = request.cursor.clone();
        let page = match ctx.call(fetch(request.clone())).await {
            Ok(page) => page,
            Err(failure) => {
                let error = failure.into_scrape_error(scope, connection, cursor);
                return Collected::partial(items, error);
            }
        };
        pages += 1;

        let next = page.next_request(&request);
        items.extend(page.nodes);

        if let Some(cursor) = request.cursor.take() {
            visited.insert(cursor);
        }
        match next {
            Ok(Some(next)) if !next.cursor.as_ref().is_some_and(|c| visited.contains(c)) => {
                request = next
            }
            Ok(None) => break,
            Ok(Some(_)) | Err(()) => {
                return Collected::partial(items, invalid_cursor(scope, connection, cursor));
            }
        }
    }

    debug!(
        "Collected {} {} for {} over {} pages",
        items.len(),
        connection,
        scope,
        pages
    );
    Collected::complete(items)
}

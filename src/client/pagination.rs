//! Cursor pagination types shared by every connection
//!
//! A connection is walked page by page: the first request carries no cursor,
//! every following request carries the `end_cursor` of the previous page.

use serde::{Deserialize, Serialize};

/// Maximum page size accepted by the GitHub GraphQL API.
pub const MAX_PAGE_SIZE: usize = 100;

/// Parameters for a single page request.
///
/// # Example
/// ```ignore
/// let first = PageRequest::first(100);
/// let next = first.after("Y3Vyc29yOjE=");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Cursor of the previous page, `None` for the first page
    pub cursor: Option<String>,
    /// Number of nodes to request
    pub page_size: usize,
}

impl PageRequest {
    /// Request the first page with the given size (clamped to `1..=MAX_PAGE_SIZE`).
    pub fn first(page_size: usize) -> Self {
        Self {
            cursor: None,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Request the page following `cursor`, keeping the page size.
    pub fn after(&self, cursor: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size: self.page_size,
        }
    }

    /// Override the page size (clamped to `1..=MAX_PAGE_SIZE`).
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Whether this requests the first page of a connection.
    pub fn is_first(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Pagination state returned with every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows this one
    #[serde(default)]
    pub has_next_page: bool,

    /// Cursor to pass when requesting the next page
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Page info for the final page of a connection.
    pub fn last() -> Self {
        Self::default()
    }

    /// Page info pointing at a following page.
    pub fn next(cursor: impl Into<String>) -> Self {
        Self {
            has_next_page: true,
            end_cursor: Some(cursor.into()),
        }
    }
}

/// One page of a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Nodes on this page, in API order
    pub nodes: Vec<T>,

    /// Pagination state
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Create the final page of a connection.
    pub fn last(nodes: Vec<T>) -> Self {
        Self {
            nodes,
            page_info: PageInfo::last(),
        }
    }

    /// Create a page that is followed by another page at `cursor`.
    pub fn with_next(nodes: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            nodes,
            page_info: PageInfo::next(cursor),
        }
    }

    /// The request for the following page, if there is one.
    ///
    /// Returns `Err(())` when the page claims a successor but its cursor is
    /// missing or points back at the page just fetched.
    #[allow(clippy::result_unit_err)]
    pub fn next_request(&self, current: &PageRequest) -> Result<Option<PageRequest>, ()> {
        if !self.page_info.has_next_page {
            return Ok(None);
        }
        match self.page_info.end_cursor.as_deref() {
            Some(cursor) if !cursor.is_empty() && current.cursor.as_deref() != Some(cursor) => {
                Ok(Some(current.after(cursor)))
            }
            _ => Err(()),
        }
    }
}

//! Error types for gitmetrics

use std::time::Duration;
use thiserror::Error;

use crate::client::Connection;

/// Result type alias for gitmetrics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Transport-level errors returned by a provider client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check the configured access token.")]
    Unauthorized,

    #[error("Access denied. The token lacks permission for this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("GraphQL query failed: {0}")]
    GraphQl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Organization not configured. Pass `--org <LOGIN>` or set `org` in the config file.")]
    MissingOrg,

    #[error("Access token not configured. Pass `--token` or set GITHUB_TOKEN.")]
    MissingToken,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Errors raised while running a scrape cycle.
///
/// The first three variants abort the cycle. The remaining two are scoped to a
/// single collector (or branch) and are reported alongside the emitted data.
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("Organization `{0}` could not be resolved")]
    OrgNotFound(String),

    #[error("Failed to validate organization: {0}")]
    OrgValidation(String),

    #[error("Failed to list repositories: {0}")]
    RepositoryList(String),

    #[error("Failed to fetch {connection} for `{repository}` at cursor {}: {message}", cursor_label(.cursor))]
    SubResourceFetch {
        repository: String,
        connection: Connection,
        cursor: Option<String>,
        message: String,
    },

    #[error("Fetching {connection} for `{repository}` was interrupted at cursor {}: {reason}", cursor_label(.cursor))]
    Cancelled {
        repository: String,
        connection: Connection,
        cursor: Option<String>,
        reason: String,
    },
}

impl ScrapeError {
    /// Whether this error aborts the whole scrape cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::OrgNotFound(_)
                | ScrapeError::OrgValidation(_)
                | ScrapeError::RepositoryList(_)
        )
    }
}

fn cursor_label(cursor: &Option<String>) -> &str {
    cursor.as_deref().unwrap_or("<start>")
}

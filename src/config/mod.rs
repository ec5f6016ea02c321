//! Configuration management for gitmetrics

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::MAX_PAGE_SIZE;
use crate::client::github::DEFAULT_ENDPOINT;
use crate::error::{ConfigError, Result};
use crate::metadata::MetricsBuilderConfig;
use crate::scraper::{DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT, ScraperConfig};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Organization (or user) login to scrape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,

    /// Repository search expression replacing `org:<login> archived:false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Personal access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Nodes requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Repositories processed (and API calls made) at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Upper bound for a single API call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between cycles of the `run` command, in seconds
    #[serde(default = "default_collection_interval_secs")]
    pub collection_interval_secs: u64,

    /// Metric and resource attribute enablement
    #[serde(flatten)]
    pub metrics: MetricsBuilderConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_collection_interval_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: None,
            search_query: None,
            endpoint: default_endpoint(),
            token: None,
            page_size: default_page_size(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            collection_interval_secs: default_collection_interval_secs(),
            metrics: MetricsBuilderConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".gitmetrics").join("config.yaml"))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load from `path` (or the default path), falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        match Self::load_from(&path) {
            Err(crate::error::Error::Config(ConfigError::NotFound(_))) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the settings a scrape needs
    pub fn validate(&self) -> Result<()> {
        self.org_login()?;

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()).into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".to_string()).into());
        }
        if self.collection_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "collection_interval_secs must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// The configured login, if it is set and non-empty
    pub fn org_login(&self) -> Result<&str> {
        match self.org.as_deref().map(str::trim) {
            Some(org) if !org.is_empty() => Ok(org),
            _ => Err(ConfigError::MissingOrg.into()),
        }
    }

    /// The configured access token
    pub fn token(&self) -> Result<&str> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ConfigError::MissingToken.into()),
        }
    }

    /// Page size clamped to what the API accepts
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    /// Scraper settings derived from this configuration
    pub fn scraper_config(&self) -> Result<ScraperConfig> {
        self.validate()?;

        Ok(ScraperConfig {
            org: self.org_login()?.to_string(),
            search_query: self.search_query.clone().filter(|q| !q.trim().is_empty()),
            page_size: self.effective_page_size(),
            concurrency: self.concurrency,
            timeout: self.timeout(),
            metrics: self.metrics.clone(),
        })
    }
}

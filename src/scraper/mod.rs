//! Scrape cycle orchestration
//!
//! One cycle validates the organization, lists its repositories, runs the
//! per-repository collectors with bounded concurrency, then reduces everything
//! into data points handed to a [`MetricSink`].
//!
//! Organization and repository-list failures abort the cycle before anything
//! is emitted. Every other failure stays with the collector that hit it and is
//! reported in [`ScrapeSummary::partial_errors`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::client::models::Organization;
use crate::client::{GitProviderApi, MAX_PAGE_SIZE};
use crate::error::{Result, ScrapeError};
use crate::metadata::MetricsBuilderConfig;
use crate::metrics::{MetricSink, MetricsBuilder, ResourceBuilder};

pub mod aggregate;
pub mod collectors;
pub mod context;
pub mod history;
pub mod org;
pub mod paginate;
pub mod parallel;
pub mod repos;

pub use collectors::RepositoryReport;
pub use context::{CancelHandle, CancelSignal, ScrapeContext};
pub use paginate::Collected;

use aggregate::aggregate;
use collectors::collect_repository;
use org::validate_org;
use parallel::run_ordered;
use repos::list_repositories;

/// Default number of nodes requested per page
pub const DEFAULT_PAGE_SIZE: usize = MAX_PAGE_SIZE;
/// Default number of repositories processed at once
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Default upper bound for a single API call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for a [`Scraper`]
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Organization (or user) login to scrape
    pub org: String,
    /// Repository search expression, overriding the default owner search
    pub search_query: Option<String>,
    pub page_size: usize,
    pub concurrency: usize,
    /// Upper bound for a single API call
    pub timeout: Duration,
    pub metrics: MetricsBuilderConfig,
}

impl ScraperConfig {
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            search_query: None,
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            metrics: MetricsBuilderConfig::default(),
        }
    }
}

/// Outcome of a completed scrape cycle
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub organization: Organization,
    /// Repositories discovered
    pub repositories: usize,
    /// Data points handed to the sink
    pub data_points: usize,
    /// Isolated failures, in repository order
    pub partial_errors: Vec<ScrapeError>,
}

impl ScrapeSummary {
    /// Whether every collector ran to completion.
    pub fn is_complete(&self) -> bool {
        self.partial_errors.is_empty()
    }
}

/// Collects metrics for one organization from a git provider.
pub struct Scraper<C: GitProviderApi + ?Sized> {
    client: Arc<C>,
    config: ScraperConfig,
    start_time: DateTime<Utc>,
}

impl<C: GitProviderApi + ?Sized> Scraper<C> {
    pub fn new(client: Arc<C>, config: ScraperConfig) -> Self {
        Self {
            client,
            config,
            start_time: Utc::now(),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// When this scraper was created; the start time of every data point.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Run one cycle that cannot be cancelled.
    pub async fn scrape(&self, sink: &dyn MetricSink) -> Result<ScrapeSummary> {
        self.scrape_with_cancel(sink, CancelSignal::never()).await
    }

    /// Run one cycle, abandoning outstanding calls once `cancel` fires.
    pub async fn scrape_with_cancel(
        &self,
        sink: &dyn MetricSink,
        cancel: CancelSignal,
    ) -> Result<ScrapeSummary> {
        self.scrape_at(sink, Utc::now(), cancel).await
    }

    /// Run one cycle observed at `now`.
    pub async fn scrape_at(
        &self,
        sink: &dyn MetricSink,
        now: DateTime<Utc>,
        cancel: CancelSignal,
    ) -> Result<ScrapeSummary> {
        let ctx = ScrapeContext::new(
            now,
            self.config.page_size,
            self.config.concurrency,
            self.config.timeout,
            cancel,
        );
        let client = self.client.as_ref();

        info!("Starting scrape of {}", self.config.org);
        let organization = validate_org(client, &ctx, &self.config.org).await?;

        let query = match &self.config.search_query {
            Some(query) => query.clone(),
            None => organization.default_search_query(),
        };
        let repositories = list_repositories(client, &ctx, &query).await?;
        let repository_count = repositories.len();

        let owner = organization.login.as_str();
        let ctx_ref = &ctx;
        let reports = run_ordered(
            repositories,
            |repository| collect_repository(client, ctx_ref, owner, repository),
            ctx.concurrency,
        )
        .await;

        let partial_errors: Vec<ScrapeError> = reports
            .iter()
            .flat_map(RepositoryReport::errors)
            .cloned()
            .collect();
        for err in &partial_errors {
            warn!("{}", err);
        }

        let organization_contributors = if reports.iter().any(|r| r.contributors.is_partial()) {
            None
        } else {
            Some(ctx.contributors.len().await)
        };

        let mut mb = MetricsBuilder::new(self.config.metrics.clone(), self.start_time);
        aggregate(&mut mb, ctx.now, &reports, organization_contributors);

        let mut rb = ResourceBuilder::new(self.config.metrics.resource_attributes.clone());
        rb.set_vendor_name(client.vendor_name());
        rb.set_organization_name(&self.config.org);

        let points = mb.emit(rb.emit());
        let data_points = points.len();
        for point in points {
            sink.emit(point);
        }

        info!(
            "Scraped {} repositories of {}: {} data points, {} partial failures",
            repository_count,
            organization.login,
            data_points,
            partial_errors.len()
        );

        Ok(ScrapeSummary {
            organization,
            repositories: repository_count,
            data_points,
            partial_errors,
        })
    }
}

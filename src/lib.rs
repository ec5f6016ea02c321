//! gitmetrics - repository health metrics scraped from a git hosting provider
//!
//! A scrape validates an organization, lists its repositories and collects
//! branches, pull requests, contributors and vulnerability alerts for each one.
//! The results are aggregated into metric data points and handed to a
//! [`metrics::MetricSink`].

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod models;
pub mod output;
pub mod scraper;

pub use error::{Error, Result};

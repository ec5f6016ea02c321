//! Per-endpoint rate limiting for the GitHub API
//!
//! Implements reactive rate limiting that only activates after the API reports
//! a primary or secondary rate limit. GraphQL and REST calls are budgeted
//! separately.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Categories of API endpoints with their throttled rates.
///
/// GitHub allows 5000 points (GraphQL) and 5000 requests (REST) per hour for a
/// token. Once throttling is active both categories are held to 80 per minute,
/// which keeps a long-running scraper inside the hourly budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    /// POST /graphql
    GraphQl,
    /// Any REST v3 path
    Rest,
}

impl EndpointCategory {
    pub const ALL: [EndpointCategory; 2] = [EndpointCategory::GraphQl, EndpointCategory::Rest];

    /// Throttled request budget for this category (requests per minute).
    pub fn per_minute(&self) -> u32 {
        match self {
            EndpointCategory::GraphQl => 80,
            EndpointCategory::Rest => 80,
        }
    }
}

/// Whether a response signals that the caller hit a rate limit.
///
/// GitHub answers 429 for secondary limits and 403 with a zero remaining
/// budget for primary limits.
pub fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0")
}

/// Throttle for one endpoint category, dormant until a limit is hit.
pub struct EndpointRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    category: EndpointCategory,
}

impl EndpointRateLimiter {
    pub fn new(category: EndpointCategory) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(category.per_minute()).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: RateLimiter::direct(quota),
            active: AtomicBool::new(false),
            category,
        }
    }

    /// Start throttling. Repeated calls are no-ops.
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("{:?} calls are now throttled to {}/min", self.category, self.category.per_minute());
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for a slot, returning at once while dormant.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Throttling {:?} call", self.category);
            self.limiter.until_ready().await;
        }
    }
}

/// One throttle per endpoint category, shared by all calls of a client.
pub struct RateLimiterSet {
    limiters: HashMap<EndpointCategory, EndpointRateLimiter>,
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterSet {
    pub fn new() -> Self {
        let limiters = EndpointCategory::ALL
            .into_iter()
            .map(|category| (category, EndpointRateLimiter::new(category)))
            .collect();

        Self { limiters }
    }

    /// Wait until a call in `category` may be sent.
    pub async fn wait_for(&self, category: EndpointCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.wait_if_active().await;
        }
    }

    pub fn activate(&self, category: EndpointCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.activate();
        }
    }

    /// Whether throttling is active for a category.
    pub fn is_active(&self, category: EndpointCategory) -> bool {
        self.limiters
            .get(&category)
            .is_some_and(EndpointRateLimiter::is_active)
    }
}

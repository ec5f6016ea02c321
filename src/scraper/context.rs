//! Per-cycle scrape context
//!
//! Holds everything that lives exactly as long as one scrape cycle: the
//! observation time, the cancellation signal, the call permits that bound
//! concurrent API calls, and the organization-wide contributor set.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Semaphore, watch};

use crate::client::Connection;
use crate::error::{Error, Result, ScrapeError};

/// Fires the cancellation of an in-flight scrape cycle.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a handle together with the signal it controls.
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelSignal { rx: Some(rx) })
    }

    /// Cancel every call still waiting on the paired signal.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation of a scrape cycle.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&self) {
        if let Some(rx) = &self.rx {
            let mut rx = rx.clone();
            if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                return;
            }
        }
        // Dropped handle or no handle at all: nothing can cancel us.
        std::future::pending::<()>().await
    }
}

/// Why a single API call did not produce a value
#[derive(Debug)]
pub enum CallFailure {
    /// The provider returned an error
    Api(Error),
    /// The call exceeded the per-call timeout
    TimedOut(Duration),
    /// The cycle was cancelled
    Cancelled,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallFailure::Api(err) => write!(f, "{}", err),
            CallFailure::TimedOut(after) => write!(f, "timed out after {:?}", after),
            CallFailure::Cancelled => f.write_str("scrape cancelled"),
        }
    }
}

impl CallFailure {
    /// Attach collector context, producing an isolated scrape error.
    pub fn into_scrape_error(
        self,
        repository: &str,
        connection: Connection,
        cursor: Option<String>,
    ) -> ScrapeError {
        let repository = repository.to_string();
        match self {
            CallFailure::Api(err) => ScrapeError::SubResourceFetch {
                repository,
                connection,
                cursor,
                message: err.to_string(),
            },
            other => ScrapeError::Cancelled {
                repository,
                connection,
                cursor,
                reason: other.to_string(),
            },
        }
    }
}

/// Distinct contributor IDs seen across the whole cycle
#[derive(Debug, Default)]
pub struct ContributorSet {
    ids: Mutex<HashSet<u64>>,
}

impl ContributorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`, returning whether it was not yet present.
    pub async fn insert(&self, id: u64) -> bool {
        self.ids.lock().await.insert(id)
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// State shared by every collector of one scrape cycle
#[derive(Debug)]
pub struct ScrapeContext {
    /// Observation time of the cycle
    pub now: DateTime<Utc>,
    /// Nodes requested per page
    pub page_size: usize,
    /// Repositories (and branches) processed at once
    pub concurrency: usize,
    /// Upper bound for a single API call
    pub call_timeout: Duration,
    pub contributors: ContributorSet,
    permits: Semaphore,
    cancel: CancelSignal,
}

impl ScrapeContext {
    pub fn new(
        now: DateTime<Utc>,
        page_size: usize,
        concurrency: usize,
        call_timeout: Duration,
        cancel: CancelSignal,
    ) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            now,
            page_size,
            concurrency,
            call_timeout,
            contributors: ContributorSet::new(),
            permits: Semaphore::new(concurrency),
            cancel,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run one API call under the cycle's limits.
    ///
    /// At most `concurrency` calls are in flight at once. Each call is bounded by
    /// `call_timeout`, and every call (queued or running) is abandoned when the
    /// cycle is cancelled.
    pub async fn call<T, F>(&self, fut: F) -> std::result::Result<T, CallFailure>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(CallFailure::Cancelled);
        }

        let bounded = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| CallFailure::Cancelled)?;
            match tokio::time::timeout(self.call_timeout, fut).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(CallFailure::Api(err)),
                Err(_) => Err(CallFailure::TimedOut(self.call_timeout)),
            }
        };

        tokio::select! {
            result = bounded => result,
            _ = self.cancel.cancelled() => Err(CallFailure::Cancelled),
        }
    }
}

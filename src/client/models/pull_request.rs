//! Pull request models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A pull request on a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    /// When the pull request was opened
    pub created_at: DateTime<Utc>,

    /// Whether the pull request has been merged
    #[serde(default)]
    pub merged: bool,

    /// When the pull request was merged
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,

    /// Whether the pull request is closed (merged or not)
    #[serde(default)]
    pub closed: bool,
}

impl PullRequest {
    /// Time from creation to merge, `None` for unmerged pull requests.
    pub fn time_to_merge(&self) -> Option<Duration> {
        if !self.merged {
            return None;
        }
        self.merged_at.map(|merged_at| merged_at - self.created_at)
    }

    /// Age of a still-open pull request at `now`.
    pub fn open_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.merged || self.closed {
            return None;
        }
        Some(now - self.created_at)
    }
}

//! Branch and commit models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A branch with its divergence from the repository's default branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    /// Branch name
    pub name: String,

    /// Commits on this branch that are not on the default branch
    #[serde(default)]
    pub ahead_by: u64,

    /// Commits on the default branch that are missing from this branch
    #[serde(default)]
    pub behind_by: u64,
}

impl Branch {
    /// Whether this branch has fallen behind the default branch.
    pub fn is_behind(&self) -> bool {
        self.behind_by > 0
    }
}

/// A commit reachable from a branch head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// When the commit was committed
    pub committed_date: DateTime<Utc>,

    /// Lines added
    #[serde(default)]
    pub additions: u64,

    /// Lines removed
    #[serde(default)]
    pub deletions: u64,
}

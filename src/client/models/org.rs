//! Organization models

use serde::{Deserialize, Serialize};

/// Kind of account that owns the scraped repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// A GitHub organization
    Organization,
    /// A personal user account
    User,
}

impl OwnerKind {
    /// Search qualifier used to scope a repository search to this owner.
    pub fn search_qualifier(&self) -> &'static str {
        match self {
            OwnerKind::Organization => "org",
            OwnerKind::User => "user",
        }
    }
}

/// A resolved scrape target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Login as reported by the provider
    pub login: String,

    /// Whether the login is an organization or a user
    pub kind: OwnerKind,
}

impl Organization {
    /// Default repository search expression for this owner.
    ///
    /// Archived repositories are excluded.
    pub fn default_search_query(&self) -> String {
        format!(
            "{}:{} archived:false",
            self.kind.search_qualifier(),
            self.login
        )
    }
}

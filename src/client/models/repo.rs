//! Repository models

use serde::{Deserialize, Serialize};

/// Repository owned by the scraped organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Provider node ID
    #[serde(default)]
    pub id: String,

    /// Repository name (without owner)
    pub name: String,

    /// Name of the default branch, absent for empty repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

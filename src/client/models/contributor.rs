//! Contributor models

use serde::{Deserialize, Serialize};

/// A distinct contributing identity on a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contributor {
    /// Stable numeric account ID
    pub id: u64,

    /// Account login
    #[serde(default)]
    pub login: String,
}

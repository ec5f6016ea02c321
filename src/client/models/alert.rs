//! Dependency vulnerability alert models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Advisory severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Upper-case label as used by the GitHub API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open dependency security alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityAlert {
    /// Provider node ID
    #[serde(default)]
    pub id: String,

    /// Severity of the underlying advisory
    pub severity: Severity,
}

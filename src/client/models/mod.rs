//! Git provider data models
//!
//! Domain types produced by a provider client after the provider's response
//! shapes have been flattened. Models are organized by resource type.

mod alert;
mod branch;
mod contributor;
mod org;
mod pull_request;
mod repo;

pub use alert::{Severity, VulnerabilityAlert};
pub use branch::{Branch, Commit};
pub use contributor::Contributor;
pub use org::{Organization, OwnerKind};
pub use pull_request::PullRequest;
pub use repo::Repository;

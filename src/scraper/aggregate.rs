//! Reduce collected repositories to metric values
//!
//! Count metrics are only recorded for complete collections, since an
//! under-count would read as a real drop. Per-item durations are recorded for
//! whatever was retrieved, each one being correct on its own.

use chrono::{DateTime, Utc};
use log::debug;

use super::collectors::RepositoryReport;
use crate::client::models::Severity;
use crate::metrics::MetricsBuilder;

/// Record all metrics of one cycle into `mb`.
///
/// `organization_contributors` is the cycle-wide distinct contributor count,
/// `None` when any repository's contributors are incomplete.
pub fn aggregate(
    mb: &mut MetricsBuilder,
    now: DateTime<Utc>,
    reports: &[RepositoryReport],
    organization_contributors: Option<usize>,
) {
    mb.record_repository_count(now, reports.len());
    if let Some(count) = organization_contributors {
        mb.record_organization_contributor_count(now, count);
    }

    for report in reports {
        record_repository(mb, now, report);
    }
}

fn record_repository(mb: &mut MetricsBuilder, now: DateTime<Utc>, report: &RepositoryReport) {
    let repo = report.repository.name.as_str();

    if let Some(count) = report.branches.complete_len() {
        mb.record_branch_count(now, count, repo);
    }
    for branch_report in &report.branches.items {
        let Some(history) = branch_report.resolved() else {
            continue;
        };
        let branch = branch_report.branch.name.as_str();
        match history.staleness(now) {
            Some(age) => mb.record_branch_time(now, age, repo, branch),
            None => debug!("Skipping staleness for {}@{}: empty history", repo, branch),
        }
        mb.record_branch_ahead_by(now, branch_report.branch.ahead_by, repo, branch);
        mb.record_branch_behind_by(now, branch_report.branch.behind_by, repo, branch);
        mb.record_branch_line_additions(now, history.additions, repo, branch);
        mb.record_branch_line_deletions(now, history.deletions, repo, branch);
    }

    if let Some(count) = report.contributors.complete_len() {
        mb.record_contributor_count(now, count, repo);
    }

    for pr in &report.pull_requests.items {
        if let Some(duration) = pr.time_to_merge() {
            mb.record_pull_request_time(now, duration, repo);
        } else if let Some(age) = pr.open_age(now) {
            mb.record_pull_request_open_time(now, age, repo);
        }
    }

    if let Some(total) = report.alerts.complete_len() {
        mb.record_cve_count(now, total, repo);
        for (severity, count) in severity_breakdown(report) {
            mb.record_cve_severity_count(now, count, repo, severity);
        }
    }
}

/// Alert count per severity, in order of first appearance.
pub fn severity_breakdown(report: &RepositoryReport) -> Vec<(Severity, usize)> {
    let mut counts: Vec<(Severity, usize)> = Vec::new();
    for alert in &report.alerts.items {
        match counts.iter_mut().find(|(s, _)| *s == alert.severity) {
            Some((_, count)) => *count += 1,
            None => counts.push((alert.severity, 1)),
        }
    }
    counts
}

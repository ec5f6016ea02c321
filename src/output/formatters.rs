//! Reusable formatting utilities for CLI output

/// Format a duration in seconds as `Xd Yh`, `Xh Ym`, `Xm Ys` or `Xs`.
///
/// Only the two most significant units are shown. Negative durations (clock
/// skew between provider and host) are shown with a leading `-`.
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return format!("-{}", format_duration(seconds.saturating_neg()));
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

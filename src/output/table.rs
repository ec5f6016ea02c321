//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns, object::Rows},
};

use crate::metrics::MetricDataPoint;
use crate::models::DataPointRow;
use crate::scraper::ScrapeSummary;

/// Format rows as a rounded table, or `empty` when there are none
pub fn format_table<T: Tabled>(data: &[T], empty: &str) -> String {
    if data.is_empty() {
        return empty.to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format the data points of a scrape, followed by a one-line summary
pub fn format_scrape_table(points: &[MetricDataPoint], summary: &ScrapeSummary) -> String {
    let rows: Vec<DataPointRow> = points.iter().map(DataPointRow::from).collect();

    let table = if rows.is_empty() {
        "No data points (all metrics disabled).".to_string()
    } else {
        let mut table = Table::new(&rows);
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Modify::new(Columns::last()).with(Alignment::right()));
        table.to_string()
    };

    let mut footer = format!(
        "{} data points from {} repositories of {}",
        points.len(),
        summary.repositories,
        summary.organization.login
    );
    if !summary.partial_errors.is_empty() {
        footer.push_str(&format!(
            " ({} partial failures)",
            summary.partial_errors.len()
        ));
    }

    format!("{}\n{}", table, footer)
}

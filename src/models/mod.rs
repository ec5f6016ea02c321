//! Display models for CLI output
//!
//! Row types that turn data points and the metric catalog into
//! table and JSON friendly shapes.

pub mod display;

pub use display::{DataPointRow, MetricRow};

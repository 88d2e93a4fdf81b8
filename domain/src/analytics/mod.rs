//! Analytics over query results: summary statistics, charts, correlation.
//!
//! Pure computation; rendering lives in the presentation layer.

pub mod report;
pub mod stats;

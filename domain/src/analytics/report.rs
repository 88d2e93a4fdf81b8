//! Analysis reports built from query results

use super::stats::{
    BarChart, CorrelationMatrix, DatasetSummary, histogram, numeric_columns, text_columns,
    top_values_chart,
};
use crate::database::result::QueryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rows shown by a table report
pub const TABLE_MAX_ROWS: usize = 20;
/// Rows shown in the data preview of a dashboard
pub const DASHBOARD_PREVIEW_ROWS: usize = 10;
/// Bins of a histogram
pub const HISTOGRAM_BINS: usize = 10;
/// Bars of a top-values chart
pub const TOP_VALUES: usize = 10;

/// Shape of an analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsKind {
    #[default]
    Dashboard,
    Summary,
    Table,
    Correlation,
}

impl AnalyticsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsKind::Dashboard => "dashboard",
            AnalyticsKind::Summary => "summary",
            AnalyticsKind::Table => "table",
            AnalyticsKind::Correlation => "correlation",
        }
    }

    pub fn all() -> &'static [AnalyticsKind] {
        &[
            AnalyticsKind::Dashboard,
            AnalyticsKind::Summary,
            AnalyticsKind::Table,
            AnalyticsKind::Correlation,
        ]
    }

    /// Split a leading kind keyword off an analytics request.
    ///
    /// Without a keyword the whole request is returned with the dashboard kind.
    pub fn split_request(arg: &str) -> (AnalyticsKind, &str) {
        let arg = arg.trim();
        let (first, rest) = match arg.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (arg, ""),
        };
        match first.parse::<AnalyticsKind>() {
            Ok(kind) => (kind, rest),
            Err(_) => (AnalyticsKind::Dashboard, arg),
        }
    }
}

impl fmt::Display for AnalyticsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalyticsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dashboard" => Ok(AnalyticsKind::Dashboard),
            "summary" | "stats" => Ok(AnalyticsKind::Summary),
            "table" => Ok(AnalyticsKind::Table),
            "correlation" | "corr" => Ok(AnalyticsKind::Correlation),
            other => Err(format!("Unknown analytics kind: {}", other)),
        }
    }
}

/// A computed analysis over one query result, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub title: String,
    pub kind: AnalyticsKind,
    pub summary: Option<DatasetSummary>,
    /// Rows to show as a table (already limited)
    pub table: Option<QueryResult>,
    pub charts: Vec<BarChart>,
    pub correlation: Option<CorrelationMatrix>,
    /// Short remarks such as "No numeric columns to correlate"
    pub notes: Vec<String>,
}

impl AnalysisReport {
    fn empty(title: String, kind: AnalyticsKind) -> Self {
        Self {
            title,
            kind,
            summary: None,
            table: None,
            charts: Vec::new(),
            correlation: None,
            notes: Vec::new(),
        }
    }

    /// Compute the report of `kind` over `data`.
    pub fn build(title: impl Into<String>, kind: AnalyticsKind, data: &QueryResult) -> Self {
        let mut report = Self::empty(title.into(), kind);
        if data.is_empty() {
            report.notes.push("No data available".to_string());
            return report;
        }

        match kind {
            AnalyticsKind::Summary => {
                report.summary = Some(DatasetSummary::compute(data));
            }
            AnalyticsKind::Table => {
                report.table = Some(data.head(TABLE_MAX_ROWS));
                if data.row_count() > TABLE_MAX_ROWS {
                    report.notes.push(format!(
                        "Showing {} of {} rows",
                        TABLE_MAX_ROWS,
                        data.row_count()
                    ));
                }
            }
            AnalyticsKind::Correlation => {
                report.correlation = CorrelationMatrix::compute(data);
                if report.correlation.is_none() {
                    report
                        .notes
                        .push("Need at least 2 numeric columns for correlation analysis".to_string());
                }
            }
            AnalyticsKind::Dashboard => {
                report.summary = Some(DatasetSummary::compute(data));
                report.table = Some(data.head(DASHBOARD_PREVIEW_ROWS));

                let numeric = numeric_columns(data);
                let text = text_columns(data);
                if let Some(&first) = numeric.first() {
                    report.charts.push(histogram(data, first, HISTOGRAM_BINS));
                    if numeric.len() > 1 {
                        report.correlation = CorrelationMatrix::compute(data);
                    }
                }
                for &col in text.iter().take(if numeric.is_empty() { 2 } else { 1 }) {
                    report.charts.push(top_values_chart(data, col, TOP_VALUES));
                }
            }
        }
        report
    }

    /// Whether the report has nothing to show beyond notes
    pub fn is_blank(&self) -> bool {
        self.summary.is_none()
            && self.table.is_none()
            && self.charts.is_empty()
            && self.correlation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::result::CellValue;

    fn orders() -> QueryResult {
        QueryResult::new(
            vec!["region".into(), "amount".into(), "qty".into()],
            (0..25)
                .map(|i| {
                    vec![
                        CellValue::from(if i % 2 == 0 { "north" } else { "south" }),
                        CellValue::Integer(i * 10),
                        CellValue::Integer(i),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_split_request() {
        assert_eq!(
            AnalyticsKind::split_request("summary of orders"),
            (AnalyticsKind::Summary, "of orders")
        );
        assert_eq!(
            AnalyticsKind::split_request("correlation"),
            (AnalyticsKind::Correlation, "")
        );
        assert_eq!(
            AnalyticsKind::split_request("count of users by region"),
            (AnalyticsKind::Dashboard, "count of users by region")
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("TABLE".parse::<AnalyticsKind>(), Ok(AnalyticsKind::Table));
        assert_eq!("corr".parse::<AnalyticsKind>(), Ok(AnalyticsKind::Correlation));
        assert!("pie".parse::<AnalyticsKind>().is_err());
    }

    #[test]
    fn test_empty_data_yields_note() {
        let empty = QueryResult::new(vec!["x".into()], vec![]);
        let report = AnalysisReport::build("t", AnalyticsKind::Dashboard, &empty);
        assert!(report.is_blank());
        assert_eq!(report.notes, vec!["No data available".to_string()]);
    }

    #[test]
    fn test_table_report_limits_rows() {
        let report = AnalysisReport::build("t", AnalyticsKind::Table, &orders());
        assert_eq!(report.table.as_ref().unwrap().row_count(), TABLE_MAX_ROWS);
        assert_eq!(report.notes, vec!["Showing 20 of 25 rows".to_string()]);
    }

    #[test]
    fn test_dashboard_contents() {
        let report = AnalysisReport::build("Orders", AnalyticsKind::Dashboard, &orders());
        assert!(report.summary.is_some());
        assert_eq!(
            report.table.as_ref().unwrap().row_count(),
            DASHBOARD_PREVIEW_ROWS
        );
        assert!(report.correlation.is_some());
        assert_eq!(report.charts.len(), 2);
        assert_eq!(report.charts[0].title, "amount Distribution");
        assert_eq!(report.charts[1].title, "Top region Values");
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let data = QueryResult::new(
            vec!["name".into(), "n".into()],
            vec![vec![CellValue::from("a"), CellValue::Integer(1)]],
        );
        let report = AnalysisReport::build("t", AnalyticsKind::Correlation, &data);
        assert!(report.correlation.is_none());
        assert_eq!(report.notes.len(), 1);
    }
}

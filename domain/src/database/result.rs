//! Tabular query results

use serde::{Deserialize, Serialize};

/// A single cell of a result set (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the cell, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{:.2}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

/// Rows returned by a statement, with column names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// Rows affected, for statements that return no rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    /// True when the driver stopped reading at the configured row limit
    #[serde(default)]
    pub truncated: bool,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: None,
            truncated: false,
        }
    }

    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected: Some(rows_affected),
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Iterate over one column's cells
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// A single-cell result, e.g. from `SELECT COUNT(*)`
    pub fn scalar(&self) -> Option<&CellValue> {
        if self.columns.len() == 1 && self.rows.len() == 1 {
            self.rows[0].first()
        } else {
            None
        }
    }

    /// Result rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let map = self
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(col, cell)| {
                        let value = serde_json::to_value(cell).unwrap_or(serde_json::Value::Null);
                        (col.clone(), value)
                    })
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(map)
            })
            .collect()
    }

    /// The first `max_rows` rows; `truncated` is set when rows were dropped
    pub fn head(&self, max_rows: usize) -> QueryResult {
        QueryResult {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(max_rows).cloned().collect(),
            rows_affected: self.rows_affected,
            truncated: self.truncated || self.rows.len() > max_rows,
        }
    }

    /// Short text rendering of the first rows, used in prompts
    pub fn preview(&self, max_rows: usize) -> String {
        if let Some(n) = self.rows_affected {
            return format!("{} row(s) affected", n);
        }
        let mut out = self.columns.join(" | ");
        for row in self.rows.iter().take(max_rows) {
            out.push('\n');
            out.push_str(
                &row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" | "),
            );
        }
        if self.rows.len() > max_rows {
            out.push_str(&format!("\n... ({} more rows)", self.rows.len() - max_rows));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult::new(
            vec!["name".to_string(), "total".to_string()],
            vec![
                vec!["alice".into(), CellValue::Integer(3)],
                vec!["bob".into(), CellValue::Float(1.5)],
                vec![CellValue::Null, CellValue::Null],
            ],
        )
    }

    #[test]
    fn test_scalar() {
        let r = QueryResult::new(vec!["count".to_string()], vec![vec![CellValue::Integer(42)]]);
        assert_eq!(r.scalar(), Some(&CellValue::Integer(42)));
        assert!(sample().scalar().is_none());
    }

    #[test]
    fn test_column_values_and_numeric_view() {
        let r = sample();
        let totals: Vec<Option<f64>> = r.column_values(1).map(CellValue::as_f64).collect();
        assert_eq!(totals, vec![Some(3.0), Some(1.5), None]);
    }

    #[test]
    fn test_to_records() {
        let records = sample().to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "alice");
        assert_eq!(records[0]["total"], 3);
        assert!(records[2]["name"].is_null());
    }

    #[test]
    fn test_preview_limits_rows() {
        let text = sample().preview(1);
        assert!(text.starts_with("name | total\nalice | 3"));
        assert!(text.ends_with("(2 more rows)"));
    }

    #[test]
    fn test_affected_preview() {
        assert_eq!(QueryResult::affected(4).preview(10), "4 row(s) affected");
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Float(2.0).to_string(), "2.00");
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }
}

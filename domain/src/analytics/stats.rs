//! Statistics over query results

use crate::database::result::{CellValue, QueryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Broad type of a result column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Text,
    /// Only NULLs
    Empty,
}

/// Decide the type of column `index`: numeric when every non-null cell is a
/// number, text when any non-null cell is not.
pub fn column_type(result: &QueryResult, index: usize) -> ColumnType {
    let mut seen = false;
    for cell in result.column_values(index) {
        if cell.is_null() {
            continue;
        }
        seen = true;
        if !cell.is_numeric() {
            return ColumnType::Text;
        }
    }
    if seen {
        ColumnType::Numeric
    } else {
        ColumnType::Empty
    }
}

pub fn numeric_columns(result: &QueryResult) -> Vec<usize> {
    (0..result.columns.len())
        .filter(|i| column_type(result, *i) == ColumnType::Numeric)
        .collect()
}

pub fn text_columns(result: &QueryResult) -> Vec<usize> {
    (0..result.columns.len())
        .filter(|i| column_type(result, *i) == ColumnType::Text)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextColumnStats {
    pub name: String,
    pub unique: usize,
}

/// Overview of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub column_count: usize,
    pub numeric_column_count: usize,
    pub text_column_count: usize,
    /// First five numeric columns
    pub numeric: Vec<NumericColumnStats>,
    /// First three text columns
    pub text: Vec<TextColumnStats>,
}

impl DatasetSummary {
    pub fn compute(result: &QueryResult) -> Self {
        let numeric_idx = numeric_columns(result);
        let text_idx = text_columns(result);

        let numeric = numeric_idx
            .iter()
            .take(5)
            .filter_map(|&i| {
                let values: Vec<f64> = result.column_values(i).filter_map(CellValue::as_f64).collect();
                if values.is_empty() {
                    return None;
                }
                let sum: f64 = values.iter().sum();
                Some(NumericColumnStats {
                    name: result.columns[i].clone(),
                    count: values.len(),
                    mean: sum / values.len() as f64,
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                })
            })
            .collect();

        let text = text_idx
            .iter()
            .take(3)
            .map(|&i| {
                let unique = value_counts(result, i).len();
                TextColumnStats {
                    name: result.columns[i].clone(),
                    unique,
                }
            })
            .collect();

        Self {
            total_records: result.row_count(),
            column_count: result.columns.len(),
            numeric_column_count: numeric_idx.len(),
            text_column_count: text_idx.len(),
            numeric,
            text,
        }
    }
}

/// One bar of a horizontal bar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Horizontal bar chart, bars sorted by value (largest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Build a chart keeping at most `max_bars` of the largest values.
    /// Bars with equal values keep their input order.
    pub fn new(title: impl Into<String>, mut bars: Vec<Bar>, max_bars: usize) -> Self {
        bars.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
        bars.truncate(max_bars);
        Self {
            title: title.into(),
            bars,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Width of a bar scaled against the chart maximum
pub fn scaled_width(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * width as f64).floor() as usize
}

/// Share of the chart maximum, in percent
pub fn percentage_of(value: f64, max: f64) -> f64 {
    if max <= 0.0 { 0.0 } else { value / max * 100.0 }
}

/// Distinct non-null values of a column with their counts, most frequent
/// first (ties broken by first appearance).
pub fn value_counts(result: &QueryResult, index: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in result.column_values(index) {
        if cell.is_null() {
            continue;
        }
        let key = match cell {
            CellValue::Text(s) => s.clone(),
            other => other.to_string(),
        };
        let entry = counts.entry(key.clone()).or_insert(0);
        if *entry == 0 {
            order.push(key);
        }
        *entry += 1;
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let n = counts[&k];
            (k, n)
        })
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Bar chart of the most frequent values of a column
pub fn top_values_chart(result: &QueryResult, index: usize, limit: usize) -> BarChart {
    let bars = value_counts(result, index)
        .into_iter()
        .take(limit)
        .map(|(label, n)| Bar {
            label,
            value: n as f64,
        })
        .collect();
    BarChart::new(format!("Top {} Values", result.columns[index]), bars, limit)
}

/// Equal-width histogram of a numeric column.
///
/// Bins keep their numeric order rather than being sorted by count.
pub fn histogram(result: &QueryResult, index: usize, bins: usize) -> BarChart {
    let title = format!("{} Distribution", result.columns[index]);
    let values: Vec<f64> = result.column_values(index).filter_map(CellValue::as_f64).collect();
    if values.is_empty() || bins == 0 {
        return BarChart {
            title,
            bars: Vec::new(),
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return BarChart {
            title,
            bars: vec![Bar {
                label: format!("{:.1}-{:.1}", min, max),
                value: values.len() as f64,
            }],
        };
    }

    let step = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &values {
        let mut bin = ((v - min) / step).floor() as usize;
        if bin >= bins {
            bin = bins - 1;
        }
        counts[bin] += 1;
    }
    let bars = counts
        .into_iter()
        .enumerate()
        .map(|(i, n)| {
            let lo = min + step * i as f64;
            let hi = lo + step;
            Bar {
                label: format!("{:.1}-{:.1}", lo, hi),
                value: n as f64,
            }
        })
        .collect();
    BarChart { title, bars }
}

/// Pearson correlation of two numeric columns over rows where both are set.
///
/// `None` with fewer than two paired values or zero variance.
pub fn pearson(result: &QueryResult, a: usize, b: usize) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = result
        .rows
        .iter()
        .filter_map(|row| {
            let x = row.get(a)?.as_f64()?;
            let y = row.get(b)?.as_f64()?;
            Some((x, y))
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Square matrix of pairwise correlations between numeric columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` correlates `columns[i]` with `columns[j]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// `None` when fewer than two numeric columns exist
    pub fn compute(result: &QueryResult) -> Option<Self> {
        let idx = numeric_columns(result);
        if idx.len() < 2 {
            return None;
        }
        let values = idx
            .iter()
            .map(|&i| {
                idx.iter()
                    .map(|&j| if i == j { Some(1.0) } else { pearson(result, i, j) })
                    .collect()
            })
            .collect();
        Some(Self {
            columns: idx.iter().map(|&i| result.columns[i].clone()).collect(),
            values,
        })
    }
}

/// Strength band of a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn of(value: f64) -> Self {
        let v = value.abs();
        if v > 0.7 {
            CorrelationStrength::Strong
        } else if v > 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> QueryResult {
        let rows = [
            ("A", 100, 20, "North"),
            ("B", 150, 30, "South"),
            ("C", 200, 45, "East"),
            ("D", 80, 15, "West"),
            ("E", 120, 25, "North"),
            ("A", 90, 18, "South"),
            ("B", 140, 28, "East"),
            ("C", 180, 38, "West"),
        ];
        QueryResult::new(
            vec![
                "product".to_string(),
                "sales".to_string(),
                "profit".to_string(),
                "region".to_string(),
            ],
            rows.iter()
                .map(|(p, s, pr, r)| {
                    vec![
                        CellValue::from(*p),
                        CellValue::Integer(*s),
                        CellValue::Integer(*pr),
                        CellValue::from(*r),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_column_types() {
        let r = sales();
        assert_eq!(numeric_columns(&r), vec![1, 2]);
        assert_eq!(text_columns(&r), vec![0, 3]);

        let nulls = QueryResult::new(vec!["x".into()], vec![vec![CellValue::Null]]);
        assert_eq!(column_type(&nulls, 0), ColumnType::Empty);
    }

    #[test]
    fn test_summary() {
        let s = DatasetSummary::compute(&sales());
        assert_eq!(s.total_records, 8);
        assert_eq!(s.column_count, 4);
        assert_eq!(s.numeric_column_count, 2);
        let sales_stats = &s.numeric[0];
        assert_eq!(sales_stats.name, "sales");
        assert_eq!(sales_stats.mean, 132.5);
        assert_eq!(sales_stats.min, 80.0);
        assert_eq!(sales_stats.max, 200.0);
        assert_eq!(s.text[0].unique, 5);
        assert_eq!(s.text[1].unique, 4);
    }

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(&sales(), 3);
        assert_eq!(counts.len(), 4);
        assert!(counts.iter().all(|(_, n)| *n == 2));
        assert_eq!(counts[0].0, "North");
    }

    #[test]
    fn test_bar_chart_sorts_and_limits() {
        let chart = BarChart::new(
            "t",
            vec![
                Bar { label: "a".into(), value: 1.0 },
                Bar { label: "b".into(), value: 5.0 },
                Bar { label: "c".into(), value: 3.0 },
            ],
            2,
        );
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "c"]);
        assert_eq!(chart.max_value(), 5.0);
    }

    #[test]
    fn test_scaled_width() {
        assert_eq!(scaled_width(50.0, 100.0, 40), 20);
        assert_eq!(scaled_width(100.0, 100.0, 40), 40);
        assert_eq!(scaled_width(1.0, 0.0, 40), 0);
        assert_eq!(percentage_of(25.0, 50.0), 50.0);
    }

    #[test]
    fn test_histogram_bins_cover_range() {
        let chart = histogram(&sales(), 1, 4);
        assert_eq!(chart.bars.len(), 4);
        let total: f64 = chart.bars.iter().map(|b| b.value).sum();
        assert_eq!(total, 8.0);
        assert_eq!(chart.bars[0].label, "80.0-110.0");
        // max value lands in the last bin
        assert!(chart.bars[3].value >= 1.0);
    }

    #[test]
    fn test_histogram_constant_column() {
        let r = QueryResult::new(
            vec!["n".into()],
            vec![vec![CellValue::Integer(7)], vec![CellValue::Integer(7)]],
        );
        let chart = histogram(&r, 0, 10);
        assert_eq!(chart.bars.len(), 1);
        assert_eq!(chart.bars[0].value, 2.0);
    }

    #[test]
    fn test_pearson() {
        let r = sales();
        let corr = pearson(&r, 1, 2).unwrap();
        assert!(corr > 0.98, "sales and profit move together: {}", corr);

        let flat = QueryResult::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(5)],
                vec![CellValue::Integer(2), CellValue::Integer(5)],
            ],
        );
        assert_eq!(pearson(&flat, 0, 1), None);
    }

    #[test]
    fn test_correlation_matrix() {
        let m = CorrelationMatrix::compute(&sales()).unwrap();
        assert_eq!(m.columns, vec!["sales".to_string(), "profit".to_string()]);
        assert_eq!(m.values[0][0], Some(1.0));
        assert_eq!(m.values[0][1], m.values[1][0]);

        let one = QueryResult::new(vec!["x".into()], vec![vec![CellValue::Integer(1)]]);
        assert!(CorrelationMatrix::compute(&one).is_none());
    }

    #[test]
    fn test_correlation_strength() {
        assert_eq!(CorrelationStrength::of(-0.9), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::of(0.5), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::of(0.1), CorrelationStrength::Weak);
    }
}

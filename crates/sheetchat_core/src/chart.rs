//! Chart mapping from backend plot codes to rendering instructions.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, ChatResult};
use crate::types::{CellValue, Record, Series};

/// Chart kinds the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

impl ChartKind {
    /// Map a backend chart code. Unknown codes fall back to scatter.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Line,
            2 => Self::Bar,
            _ => Self::Scatter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to draw a chart: one x-axis column, one or more series columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRenderPlan {
    #[serde(rename = "xAxis")]
    pub x_axis: String,
    pub series: Vec<String>,
    pub kind: ChartKind,
}

/// Build the render plan for a chart code and column order.
///
/// Fails with fewer than two columns or when a column name repeats, since
/// each column becomes exactly one series.
pub fn chart_render_plan(code: i64, columns: &[String]) -> ChatResult<ChartRenderPlan> {
    let mut seen = IndexSet::with_capacity(columns.len());
    if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(ChatError::InvalidChartSpec(format!(
            "column '{}' appears more than once",
            duplicate
        )));
    }

    match columns.split_first() {
        Some((x_axis, series)) if !series.is_empty() => Ok(ChartRenderPlan {
            x_axis: x_axis.clone(),
            series: series.to_vec(),
            kind: ChartKind::from_code(code),
        }),
        _ => Err(ChatError::InvalidChartSpec(format!(
            "expected at least 2 columns, got {}",
            columns.len()
        ))),
    }
}

/// Project rows onto exactly `columns`, in that order.
///
/// Returns the name of the first column missing from a row.
pub fn project_series(rows: &[Record], columns: &[String]) -> Result<Series, String> {
    let mut series: Series = columns
        .iter()
        .map(|c| (c.clone(), Vec::with_capacity(rows.len())))
        .collect();

    for (index, row) in rows.iter().enumerate() {
        for column in columns {
            let value = row
                .get(column)
                .cloned()
                .ok_or_else(|| format!("row {} has no column '{}'", index, column))?;
            if let Some(values) = series.get_mut(column) {
                values.push(value);
            }
        }
    }

    Ok(series)
}

/// Pair up the x-axis with one series for point-wise rendering.
pub fn points<'a>(
    series: &'a Series,
    plan: &ChartRenderPlan,
    column: &str,
) -> Vec<(&'a CellValue, &'a CellValue)> {
    match (series.get(&plan.x_axis), series.get(column)) {
        (Some(xs), Some(ys)) => xs.iter().zip(ys.iter()).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_line_plan() {
        let plan = chart_render_plan(1, &cols(&["date", "sales"])).unwrap();
        assert_eq!(plan.x_axis, "date");
        assert_eq!(plan.series, cols(&["sales"]));
        assert_eq!(plan.kind, ChartKind::Line);
    }

    #[test]
    fn test_bar_plan_multiple_series() {
        let plan = chart_render_plan(2, &cols(&["a", "b", "c"])).unwrap();
        assert_eq!(plan.kind, ChartKind::Bar);
        assert_eq!(plan.series, cols(&["b", "c"]));
    }

    #[test]
    fn test_scatter_fallback() {
        assert_eq!(chart_render_plan(99, &cols(&["a", "b"])).unwrap().kind, ChartKind::Scatter);
        assert_eq!(chart_render_plan(3, &cols(&["a", "b"])).unwrap().kind, ChartKind::Scatter);
        assert_eq!(chart_render_plan(-1, &cols(&["a", "b"])).unwrap().kind, ChartKind::Scatter);
    }

    #[test]
    fn test_too_few_columns() {
        assert!(matches!(
            chart_render_plan(1, &cols(&["a"])),
            Err(ChatError::InvalidChartSpec(_))
        ));
        assert!(matches!(
            chart_render_plan(1, &[]),
            Err(ChatError::InvalidChartSpec(_))
        ));
    }

    #[test]
    fn test_repeated_column_rejected() {
        let err = chart_render_plan(1, &cols(&["a", "a", "b"])).unwrap_err();
        match err {
            ChatError::InvalidChartSpec(reason) => assert!(reason.contains("'a'")),
            other => panic!("expected invalid chart, got {:?}", other),
        }
        assert!(chart_render_plan(2, &cols(&["a", "b", "b"])).is_err());
    }

    #[test]
    fn test_project_series_keeps_column_order() {
        let rows: Vec<Record> = vec![
            serde_json::from_str(r#"{"region":"north","month":"jan","sales":10}"#).unwrap(),
            serde_json::from_str(r#"{"region":"south","month":"feb","sales":12}"#).unwrap(),
        ];
        let series = project_series(&rows, &cols(&["month", "sales"])).unwrap();

        let keys: Vec<&String> = series.keys().collect();
        assert_eq!(keys, vec!["month", "sales"]);
        assert_eq!(series["month"][1], CellValue::Text("feb".to_string()));
        assert_eq!(series["sales"][0].as_f64(), Some(10.0));
        assert!(!series.contains_key("region"));
    }

    #[test]
    fn test_project_series_missing_column() {
        let rows: Vec<Record> = vec![serde_json::from_str(r#"{"month":"jan"}"#).unwrap()];
        let err = project_series(&rows, &cols(&["month", "sales"])).unwrap_err();
        assert!(err.contains("sales"));
    }

    #[test]
    fn test_points() {
        let rows: Vec<Record> = vec![
            serde_json::from_str(r#"{"x":1,"y":2}"#).unwrap(),
            serde_json::from_str(r#"{"x":3,"y":4}"#).unwrap(),
        ];
        let columns = cols(&["x", "y"]);
        let series = project_series(&rows, &columns).unwrap();
        let plan = chart_render_plan(3, &columns).unwrap();

        let pts = points(&series, &plan, "y");
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].0.as_f64(), Some(3.0));
        assert_eq!(pts[1].1.as_f64(), Some(4.0));
    }
}

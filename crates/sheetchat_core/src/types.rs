//! Core types for the query session engine.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartKind, ChartRenderPlan};

/// A single cell value in a backend row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(serde_json::Number),
    Text(String),
    Null,
}

impl CellValue {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Convert a raw JSON value, rejecting anything that is not a flat scalar.
    pub fn from_json(value: serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::Number(n) => Ok(Self::Number(n)),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Null => Ok(Self::Null),
            other => Err(format!("unsupported cell value: {}", other)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// One row of a tabular result, keyed by column name in backend order.
pub type Record = IndexMap<String, CellValue>;

/// Column name to ordered values, in column order.
pub type Series = IndexMap<String, Vec<CellValue>>;

/// Intent of a user utterance. Never stored in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Plot,
    Show,
    Download,
    Answer,
}

impl QueryIntent {
    /// Backend operation that serves this intent.
    pub fn operation(&self) -> QueryOperation {
        match self {
            Self::Plot => QueryOperation::Plot,
            Self::Show => QueryOperation::Show,
            Self::Download => QueryOperation::Download,
            Self::Answer => QueryOperation::Answer,
        }
    }
}

/// Operations offered by the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOperation {
    Answer,
    Show,
    Plot,
    Download,
}

impl QueryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Show => "show",
            Self::Plot => "plot",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projected chart data carried by a chart message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Column order; the first column is the x-axis
    pub columns: Vec<String>,
    /// Values per column
    pub series: Series,
    /// Chart kind chosen by the backend
    #[serde(rename = "chartKind")]
    pub chart_kind: ChartKind,
}

impl ChartData {
    /// Rendering instructions for this chart, `None` with fewer than two columns.
    pub fn render_plan(&self) -> Option<ChartRenderPlan> {
        let (x_axis, series) = self.columns.split_first()?;
        if series.is_empty() {
            return None;
        }
        Some(ChartRenderPlan {
            x_axis: x_axis.clone(),
            series: series.to_vec(),
            kind: self.chart_kind,
        })
    }

    /// Number of plotted points.
    pub fn len(&self) -> usize {
        self.series.values().next().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single history entry. The tag selects the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Raw user utterance
    User { text: String },
    /// Prose answer
    AssistantText { text: String },
    /// Tabular result
    AssistantTable { rows: Vec<Record> },
    /// Chart result
    AssistantChart(ChartData),
    /// Marker that a spreadsheet export was offered
    AssistantDownload {
        #[serde(rename = "tableName")]
        table_name: String,
    },
}

impl Message {
    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    /// Create a new assistant prose message
    pub fn text(text: impl Into<String>) -> Self {
        Self::AssistantText { text: text.into() }
    }

    pub fn table(rows: Vec<Record>) -> Self {
        Self::AssistantTable { rows }
    }

    pub fn chart(data: ChartData) -> Self {
        Self::AssistantChart(data)
    }

    pub fn download(table_name: impl Into<String>) -> Self {
        Self::AssistantDownload {
            table_name: table_name.into(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Self::User { .. } => MessageRole::User,
            _ => MessageRole::Assistant,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role() == MessageRole::User
    }

    /// Render plan of a chart message, `None` for every other kind.
    pub fn chart_plan(&self) -> Option<ChartRenderPlan> {
        match self {
            Self::AssistantChart(data) => data.render_plan(),
            _ => None,
        }
    }
}

/// Body sent to every query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(rename = "tableName")]
    pub table_name: String,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            table_name: table_name.into(),
        }
    }
}

/// Typed plot endpoint response.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotResponse {
    pub all_data: Vec<Record>,
    pub columns: Vec<String>,
    pub plot: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_tag_serialization() {
        let json = serde_json::to_value(Message::download("sales")).unwrap();
        assert_eq!(json["kind"], "assistant_download");
        assert_eq!(json["tableName"], "sales");
        assert!(json.get("text").is_none());

        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["kind"], "user");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn test_roles() {
        assert!(Message::user("q").is_user());
        assert_eq!(Message::text("a").role(), MessageRole::Assistant);
        assert_eq!(Message::table(Vec::new()).role(), MessageRole::Assistant);
    }

    #[test]
    fn test_cell_value_rejects_nested() {
        assert!(CellValue::from_json(serde_json::json!([1, 2])).is_err());
        assert!(CellValue::from_json(serde_json::json!(true)).is_err());
        assert_eq!(
            CellValue::from_json(serde_json::json!("x")).unwrap(),
            CellValue::Text("x".to_string())
        );
        assert_eq!(CellValue::from_json(serde_json::Value::Null).unwrap(), CellValue::Null);
    }

    #[test]
    fn test_chart_plan_only_for_charts() {
        assert!(Message::text("x").chart_plan().is_none());

        let mut series = Series::new();
        series.insert("day".to_string(), vec![CellValue::Text("mon".to_string())]);
        series.insert("hits".to_string(), vec![CellValue::from(3i64)]);
        let msg = Message::chart(ChartData {
            columns: vec!["day".to_string(), "hits".to_string()],
            series,
            chart_kind: ChartKind::Bar,
        });

        let plan = msg.chart_plan().unwrap();
        assert_eq!(plan.x_axis, "day");
        assert_eq!(plan.series, vec!["hits".to_string()]);
        assert_eq!(plan.kind, ChartKind::Bar);
    }
}

//! Query service adapter.
//!
//! Every response is parsed into typed values here; raw JSON never leaves
//! this module.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult, ChatError, ChatResult};
use crate::types::{CellValue, PlotResponse, QueryOperation, QueryRequest, Record};

/// Answer endpoint path.
pub const ANSWER_PATH: &str = "dbQuery/";
/// Tabular endpoint path, also used for full-table downloads.
pub const SHOW_PATH: &str = "dbQuery/show";
/// Plot endpoint path.
pub const PLOT_PATH: &str = "dbQuery/plot";

/// Typed access to the query service.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Ask for a prose answer.
    async fn answer(&self, request: &QueryRequest) -> BackendResult<String>;

    /// Ask for tabular rows.
    ///
    /// `operation` is reported in errors, since downloads reuse this endpoint.
    async fn show(&self, request: &QueryRequest, operation: QueryOperation) -> BackendResult<Vec<Record>>;

    /// Ask for chart data.
    async fn plot(&self, request: &QueryRequest) -> BackendResult<PlotResponse>;
}

/// HTTP implementation of [`QueryBackend`].
pub struct HttpBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> ChatResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &QueryRequest,
        operation: QueryOperation,
    ) -> BackendResult<T> {
        let url = self.config.endpoint(path);
        debug!(%url, %operation, "Posting query");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::transport(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::status(operation, status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(operation, e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| BackendError::malformed(operation, e.to_string()))
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn answer(&self, request: &QueryRequest) -> BackendResult<String> {
        self.post(ANSWER_PATH, request, QueryOperation::Answer).await
    }

    async fn show(&self, request: &QueryRequest, operation: QueryOperation) -> BackendResult<Vec<Record>> {
        let raw: serde_json::Value = self.post(SHOW_PATH, request, operation).await?;
        parse_records(raw).map_err(|e| BackendError::malformed(operation, e))
    }

    async fn plot(&self, request: &QueryRequest) -> BackendResult<PlotResponse> {
        let raw: serde_json::Value = self.post(PLOT_PATH, request, QueryOperation::Plot).await?;
        parse_plot(raw).map_err(|e| BackendError::malformed(QueryOperation::Plot, e))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlotResponse {
    all_data: serde_json::Value,
    plot_data: RawPlotData,
}

#[derive(Deserialize)]
struct RawPlotData {
    columns: Vec<String>,
    plot: i64,
}

/// Parse a JSON array of flat objects.
pub fn parse_records(value: serde_json::Value) -> Result<Vec<Record>, String> {
    let rows = match value {
        serde_json::Value::Array(rows) => rows,
        other => return Err(format!("expected an array of rows, got {}", kind_of(&other))),
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            serde_json::Value::Object(fields) => fields
                .into_iter()
                .map(|(column, value)| {
                    CellValue::from_json(value)
                        .map(|cell| (column.clone(), cell))
                        .map_err(|e| format!("row {}, column '{}': {}", index, column, e))
                })
                .collect::<Result<Record, String>>(),
            other => Err(format!("row {} is {}, expected an object", index, kind_of(&other))),
        })
        .collect()
}

/// Parse the plot endpoint's `{allData, plotData: {columns, plot}}` shape.
pub fn parse_plot(value: serde_json::Value) -> Result<PlotResponse, String> {
    let raw: RawPlotResponse = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok(PlotResponse {
        all_data: parse_records(raw.all_data)?,
        columns: raw.plot_data.columns,
        plot: raw.plot_data.plot,
    })
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

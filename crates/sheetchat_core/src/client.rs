//! Intent dispatch over a [`QueryBackend`].
//!
//! Turns an intent, utterance and table name into one backend operation and
//! normalizes the result into an assistant [`Message`]. Never touches
//! session history.

use tracing::debug;

use crate::backend::QueryBackend;
use crate::chart::{chart_render_plan, project_series};
use crate::error::{BackendCause, BackendError, ChatError, ChatResult};
use crate::export::{encode_workbook, export_file_name, ExportArtifact};
use crate::types::{ChartData, Message, QueryIntent, QueryOperation, QueryRequest};

/// Question sent to the tabular endpoint to fetch the whole table.
pub const DOWNLOAD_QUESTION: &str = "show all data";

/// Result of one dispatched operation.
#[derive(Debug, Clone)]
pub struct Reply {
    pub message: Message,
    /// Spreadsheet produced by a download, if any
    pub export: Option<ExportArtifact>,
}

impl Reply {
    fn message(message: Message) -> Self {
        Self {
            message,
            export: None,
        }
    }
}

/// Maps intents to backend calls.
pub struct QueryClient<B> {
    backend: B,
}

impl<B: QueryBackend> QueryClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Perform the operation for `intent`.
    ///
    /// Backend failures come back as [`ChatError::Backend`]; a plot response
    /// with fewer than two columns is [`ChatError::InvalidChartSpec`].
    pub async fn dispatch(
        &self,
        intent: QueryIntent,
        question: &str,
        table_name: &str,
    ) -> ChatResult<Reply> {
        debug!(?intent, operation = %intent.operation(), table_name, "Dispatching query");
        match intent {
            QueryIntent::Answer => self.answer(question, table_name).await,
            QueryIntent::Show => self.show(question, table_name).await,
            QueryIntent::Plot => self.plot(question, table_name).await,
            QueryIntent::Download => self.download(table_name).await,
        }
    }

    async fn answer(&self, question: &str, table_name: &str) -> ChatResult<Reply> {
        let text = self
            .backend
            .answer(&QueryRequest::new(question, table_name))
            .await?;
        Ok(Reply::message(Message::text(text)))
    }

    async fn show(&self, question: &str, table_name: &str) -> ChatResult<Reply> {
        let rows = self
            .backend
            .show(&QueryRequest::new(question, table_name), QueryOperation::Show)
            .await?;
        Ok(Reply::message(Message::table(rows)))
    }

    async fn plot(&self, question: &str, table_name: &str) -> ChatResult<Reply> {
        let response = self
            .backend
            .plot(&QueryRequest::new(question, table_name))
            .await?;

        let plan = chart_render_plan(response.plot, &response.columns)?;
        let series = project_series(&response.all_data, &response.columns)
            .map_err(|e| ChatError::from(BackendError::malformed(QueryOperation::Plot, e)))?;

        Ok(Reply::message(Message::chart(ChartData {
            columns: response.columns,
            series,
            chart_kind: plan.kind,
        })))
    }

    async fn download(&self, table_name: &str) -> ChatResult<Reply> {
        let rows = self
            .backend
            .show(
                &QueryRequest::new(DOWNLOAD_QUESTION, table_name),
                QueryOperation::Download,
            )
            .await?;

        let bytes = encode_workbook(&rows).map_err(|e| {
            BackendError::new(QueryOperation::Download, BackendCause::Export(e.to_string()))
        })?;

        Ok(Reply {
            message: Message::download(table_name),
            export: Some(ExportArtifact {
                file_name: export_file_name(table_name),
                bytes,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::mock::{MockBackend, MockReply};
    use serde_json::json;

    #[tokio::test]
    async fn test_plot_projects_columns_in_order() {
        let backend = MockBackend::new().add_reply(MockReply::plot(json!({
            "allData": [
                {"region": "n", "sales": 3, "month": "jan"},
                {"region": "s", "sales": 4, "month": "feb"}
            ],
            "plotData": {"columns": ["month", "sales"], "plot": 1}
        })));
        let client = QueryClient::new(backend);

        let reply = client
            .dispatch(QueryIntent::Plot, "plot sales by month", "orders")
            .await
            .unwrap();

        match reply.message {
            Message::AssistantChart(data) => {
                assert_eq!(data.chart_kind, ChartKind::Line);
                assert_eq!(data.columns, vec!["month".to_string(), "sales".to_string()]);
                let keys: Vec<&String> = data.series.keys().collect();
                assert_eq!(keys, vec!["month", "sales"]);
                assert_eq!(data.len(), 2);
            }
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plot_single_column_is_invalid_chart() {
        let backend = MockBackend::new().add_reply(MockReply::plot(json!({
            "allData": [{"month": "jan"}],
            "plotData": {"columns": ["month"], "plot": 2}
        })));
        let client = QueryClient::new(backend);

        let err = client
            .dispatch(QueryIntent::Plot, "plot it", "orders")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidChartSpec(_)));
    }

    #[tokio::test]
    async fn test_plot_repeated_column_is_invalid_chart() {
        let backend = MockBackend::new().add_reply(MockReply::plot(json!({
            "allData": [{"a": 1, "b": 2}, {"a": 3, "b": 4}],
            "plotData": {"columns": ["a", "a", "b"], "plot": 1}
        })));
        let client = QueryClient::new(backend);

        let err = client
            .dispatch(QueryIntent::Plot, "plot a against b", "orders")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidChartSpec(_)));
    }

    #[tokio::test]
    async fn test_plot_missing_column_is_backend_error() {
        let backend = MockBackend::new().add_reply(MockReply::plot(json!({
            "allData": [{"month": "jan"}],
            "plotData": {"columns": ["month", "sales"], "plot": 2}
        })));
        let client = QueryClient::new(backend);

        let err = client
            .dispatch(QueryIntent::Plot, "plot it", "orders")
            .await
            .unwrap_err();
        match err {
            ChatError::Backend(e) => assert_eq!(e.operation, QueryOperation::Plot),
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_uses_sentinel_question() {
        let backend = MockBackend::new().add_reply(MockReply::rows(json!([
            {"id": 1, "name": "a"},
            {"id": 2, "name": "b"}
        ])));
        let client = QueryClient::new(backend.clone());

        let reply = client
            .dispatch(QueryIntent::Download, "download my stuff", "orders")
            .await
            .unwrap();

        assert_eq!(reply.message, Message::download("orders"));
        let export = reply.export.unwrap();
        assert_eq!(export.file_name, "orders.xlsx");
        assert_eq!(&export.bytes[..2], b"PK");

        let calls = backend.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, QueryOperation::Download);
        assert_eq!(calls[0].request.question, DOWNLOAD_QUESTION);
        assert_eq!(calls[0].request.table_name, "orders");
    }

    #[tokio::test]
    async fn test_answer_and_show() {
        let backend = MockBackend::new().with_replies(vec![
            MockReply::answer("There are 42 rows."),
            MockReply::rows(json!([{"product": "pen", "units": 3}])),
        ]);
        let client = QueryClient::new(backend);

        let answer = client
            .dispatch(QueryIntent::Answer, "how many rows?", "orders")
            .await
            .unwrap();
        assert_eq!(answer.message, Message::text("There are 42 rows."));
        assert!(answer.export.is_none());

        let table = client
            .dispatch(QueryIntent::Show, "show products", "orders")
            .await
            .unwrap();
        match table.message {
            Message::AssistantTable { rows } => assert_eq!(rows.len(), 1),
            other => panic!("expected table, got {:?}", other),
        }
    }
}

//! Mock query backend for testing.
//!
//! Replays scripted replies in order and captures every request, so the
//! session engine can be exercised without a running query service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::backend::{parse_plot, parse_records, QueryBackend};
use crate::error::{BackendError, BackendResult};
use crate::types::{PlotResponse, QueryOperation, QueryRequest, Record};

/// Scripted reply for the next backend call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Bare string from the answer endpoint
    Answer(String),
    /// Raw JSON from the tabular endpoint
    Rows(serde_json::Value),
    /// Raw JSON from the plot endpoint
    Plot(serde_json::Value),
    /// Non-success HTTP status
    Status { status: u16, body: String },
    /// Connection-level failure
    Transport(String),
}

impl MockReply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer(text.into())
    }

    pub fn rows(json: serde_json::Value) -> Self {
        Self::Rows(json)
    }

    pub fn plot(json: serde_json::Value) -> Self {
        Self::Plot(json)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub operation: QueryOperation,
    pub request: QueryRequest,
}

/// Mock query backend.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the engine.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Scripted replies, consumed in order.
    replies: Arc<RwLock<Vec<MockReply>>>,
    /// Index of next reply to return.
    reply_index: Arc<AtomicUsize>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Failure returned by every call when set.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn add_reply(self, reply: MockReply) -> Self {
        self.replies.write().push(reply);
        self
    }

    /// Replace the reply queue.
    pub fn with_replies(self, replies: Vec<MockReply>) -> Self {
        *self.replies.write() = replies;
        self
    }

    /// Make every call fail with a transport error.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Stop simulating failures.
    pub fn clear_failure(&self) {
        *self.simulate_failure.write() = None;
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    fn record_call(&self, operation: QueryOperation, request: &QueryRequest) {
        self.captured_calls.write().push(CapturedCall {
            operation,
            request: request.clone(),
        });
    }

    fn next_reply(&self, operation: QueryOperation) -> BackendResult<MockReply> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(BackendError::transport(operation, msg));
        }

        let index = self.reply_index.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .read()
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::transport(operation, "no scripted reply left"))?;

        match reply {
            MockReply::Status { status, body } => Err(BackendError::status(operation, status, body)),
            MockReply::Transport(msg) => Err(BackendError::transport(operation, msg)),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn answer(&self, request: &QueryRequest) -> BackendResult<String> {
        let operation = QueryOperation::Answer;
        self.record_call(operation, request);
        match self.next_reply(operation)? {
            MockReply::Answer(text) => Ok(text),
            other => Err(BackendError::malformed(
                operation,
                format!("expected a string, got {:?}", other),
            )),
        }
    }

    async fn show(
        &self,
        request: &QueryRequest,
        operation: QueryOperation,
    ) -> BackendResult<Vec<Record>> {
        self.record_call(operation, request);
        match self.next_reply(operation)? {
            MockReply::Rows(json) => {
                parse_records(json).map_err(|e| BackendError::malformed(operation, e))
            }
            other => Err(BackendError::malformed(
                operation,
                format!("expected rows, got {:?}", other),
            )),
        }
    }

    async fn plot(&self, request: &QueryRequest) -> BackendResult<PlotResponse> {
        let operation = QueryOperation::Plot;
        self.record_call(operation, request);
        match self.next_reply(operation)? {
            MockReply::Plot(json) => {
                parse_plot(json).map_err(|e| BackendError::malformed(operation, e))
            }
            other => Err(BackendError::malformed(
                operation,
                format!("expected plot data, got {:?}", other),
            )),
        }
    }
}

//! Session engine.
//!
//! This module is the entry point for chat operations: it binds a session to
//! a table, classifies each utterance, dispatches it through the
//! [`QueryClient`], and appends the results to history.
//!
//! Submissions take `&mut self`, so a second utterance cannot start while
//! the first is still awaiting the backend.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::QueryBackend;
use crate::client::{QueryClient, Reply};
use crate::error::{ChatError, ChatResult};
use crate::export::ExportArtifact;
use crate::intent::classify;
use crate::store::Session;
use crate::types::{Message, QueryIntent};

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No table registered yet
    Unbound,
    /// Table registered; queries allowed
    Bound,
}

/// Outcome of one submitted utterance.
#[derive(Debug, Clone)]
pub struct Turn {
    pub intent: QueryIntent,
    /// The assistant message appended for this turn
    pub reply: Message,
    /// Spreadsheet produced by a download turn
    pub export: Option<ExportArtifact>,
    /// Whether the reply describes a recovered backend failure
    pub recovered: bool,
}

/// Orchestrates classifier, client and store for one session.
pub struct SessionEngine<B> {
    client: QueryClient<B>,
    session: Option<Session>,
}

impl<B: QueryBackend> SessionEngine<B> {
    /// Create an unbound engine.
    pub fn new(backend: B) -> Self {
        Self {
            client: QueryClient::new(backend),
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.session {
            Some(_) => SessionState::Bound,
            None => SessionState::Unbound,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.session.as_ref().map(Session::table_name)
    }

    pub fn backend(&self) -> &B {
        self.client.backend()
    }

    /// Bind the engine to a table. Only allowed once.
    pub fn bind(&mut self, table_name: impl Into<String>) -> ChatResult<&Session> {
        if let Some(existing) = &self.session {
            return Err(ChatError::AlreadyBound(existing.table_name().to_string()));
        }

        let session = Session::bind(table_name)?;
        info!(
            session_id = session.id(),
            table = session.table_name(),
            bound_at = %session.bound_at(),
            "Session bound"
        );
        Ok(self.session.insert(session))
    }

    /// Process one utterance.
    ///
    /// The user message is always recorded. Backend failures are turned into
    /// an assistant text message and do not surface as errors.
    pub async fn submit_utterance(&mut self, text: &str) -> ChatResult<Turn> {
        let session = self.session.as_mut().ok_or(ChatError::SessionNotBound)?;
        session.append(Message::user(text));

        let intent = classify(text);
        let result = self
            .client
            .dispatch(intent, text, session.table_name())
            .await;

        let (reply, recovered) = match result {
            Ok(reply) => (reply, false),
            Err(ChatError::Backend(err)) => {
                warn!(operation = %err.operation, error = %err, "Backend request failed");
                (
                    Reply {
                        message: Message::text(err.user_message()),
                        export: None,
                    },
                    true,
                )
            }
            Err(other) => return Err(other),
        };

        let message = session.append(reply.message).clone();
        info!(?intent, recovered, history_len = session.len(), "Turn complete");

        Ok(Turn {
            intent,
            reply: message,
            export: reply.export,
            recovered,
        })
    }

    /// Full history in display order. Empty while unbound.
    pub fn replay(&self) -> &[Message] {
        self.session.as_ref().map(Session::history).unwrap_or(&[])
    }
}

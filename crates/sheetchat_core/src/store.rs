//! Session store: the bound table and its append-only history.

use chrono::{DateTime, Utc};

use crate::error::{ChatError, ChatResult};
use crate::types::Message;

/// Unique identifier for a session
pub type SessionId = String;

/// One user's conversation with one bound table.
///
/// The table name is fixed at construction. Messages can only be appended.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    table_name: String,
    bound_at: DateTime<Utc>,
    history: Vec<Message>,
}

impl Session {
    /// Create a session bound to `table_name`.
    pub fn bind(table_name: impl Into<String>) -> ChatResult<Self> {
        let table_name = table_name.into();
        if table_name.trim().is_empty() {
            return Err(ChatError::EmptyTableName);
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            table_name,
            bound_at: Utc::now(),
            history: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn bound_at(&self) -> DateTime<Utc> {
        self.bound_at
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub(crate) fn append(&mut self, message: Message) -> &Message {
        self.history.push(message);
        &self.history[self.history.len() - 1]
    }
}

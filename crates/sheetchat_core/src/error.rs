//! Error types for the query session engine.

use thiserror::Error;

use crate::types::QueryOperation;

/// Result type alias for session operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by the session engine.
///
/// `SessionNotBound`, `AlreadyBound`, `EmptyTableName` and `InvalidChartSpec`
/// are caller contract violations. `Backend` is only returned by the client
/// layer; the engine turns it into an assistant message.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Session is not bound to a table")]
    SessionNotBound,

    #[error("Session is already bound to table '{0}'")]
    AlreadyBound(String),

    #[error("Table name must not be empty")]
    EmptyTableName,

    #[error("Invalid chart spec: {0}")]
    InvalidChartSpec(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Underlying reason a backend operation failed.
#[derive(Error, Debug)]
pub enum BackendCause {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("query service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("spreadsheet export failed: {0}")]
    Export(String),
}

/// A failed call to the query service.
#[derive(Error, Debug)]
#[error("{operation} request failed: {cause}")]
pub struct BackendError {
    pub operation: QueryOperation,
    #[source]
    pub cause: BackendCause,
}

impl BackendError {
    pub fn new(operation: QueryOperation, cause: BackendCause) -> Self {
        Self { operation, cause }
    }

    pub fn transport(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, BackendCause::Transport(message.into()))
    }

    pub fn status(operation: QueryOperation, status: u16, body: impl Into<String>) -> Self {
        Self::new(
            operation,
            BackendCause::Status {
                status,
                body: body.into(),
            },
        )
    }

    pub fn malformed(operation: QueryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, BackendCause::Malformed(message.into()))
    }

    /// Text shown to the user in place of the failed answer.
    ///
    /// Never includes response bodies or error chains.
    pub fn user_message(&self) -> String {
        let what = match self.operation {
            QueryOperation::Answer => "answer that question",
            QueryOperation::Show => "fetch that table",
            QueryOperation::Plot => "build that chart",
            QueryOperation::Download => "prepare the download",
        };
        let why = match &self.cause {
            BackendCause::Transport(_) => "the query service could not be reached".to_string(),
            BackendCause::Status { status, .. } => {
                format!("the query service returned an error (status {})", status)
            }
            BackendCause::Malformed(_) => {
                "the query service sent a response I could not read".to_string()
            }
            BackendCause::Export(_) => "the spreadsheet could not be created".to_string(),
        };
        format!("Sorry, I couldn't {}: {}. Please try again.", what, why)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_body() {
        let err = BackendError::status(QueryOperation::Show, 500, "ER_PARSE_ERROR at line 1");
        let msg = err.user_message();
        assert!(msg.contains("status 500"));
        assert!(msg.contains("fetch that table"));
        assert!(!msg.contains("ER_PARSE_ERROR"));
    }

    #[test]
    fn test_display_includes_operation() {
        let err = BackendError::transport(QueryOperation::Plot, "connection refused");
        assert_eq!(
            err.to_string(),
            "plot request failed: transport error: connection refused"
        );
    }

    #[test]
    fn test_backend_error_converts() {
        let err: ChatError = BackendError::malformed(QueryOperation::Answer, "missing").into();
        assert!(matches!(err, ChatError::Backend(_)));
    }
}

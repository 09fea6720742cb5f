//! # sheetchat_core - Conversational Query Session Engine
//!
//! This crate lets a user question one registered table through free-text
//! utterances and keeps a typed, replayable history of the conversation.
//!
//! ## Architecture
//!
//! ```text
//! utterance ──▶ classify ──▶ SessionEngine ──▶ QueryClient ──▶ QueryBackend
//!                                 │                 │
//!                                 │                 └── chart mapping / xlsx export
//!                                 ▼
//!                          Session history ──▶ replay() ──▶ renderer
//! ```
//!
//! - **Intent**: keyword classifier (plot > show > download > answer)
//! - **Backend**: typed adapter over the HTTP query service
//! - **Chart**: chart code + column order to rendering instructions
//! - **Session**: bound table plus append-only history
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetchat_core::{BackendConfig, HttpBackend, SessionEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new(BackendConfig::from_env()?)?;
//!     let mut engine = SessionEngine::new(backend);
//!     engine.bind("sales_2024")?;
//!
//!     engine.submit_utterance("plot revenue by month").await?;
//!     for message in engine.replay() {
//!         println!("{:?}", message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod intent;
pub mod mock;
pub mod session;
pub mod store;
pub mod types;

pub use backend::{HttpBackend, QueryBackend, ANSWER_PATH, PLOT_PATH, SHOW_PATH};
pub use chart::{chart_render_plan, project_series, ChartKind, ChartRenderPlan};
pub use client::{QueryClient, Reply, DOWNLOAD_QUESTION};
pub use config::BackendConfig;
pub use error::{BackendCause, BackendError, BackendResult, ChatError, ChatResult};
pub use export::{encode_workbook, export_file_name, ExportArtifact};
pub use intent::classify;
pub use mock::{CapturedCall, MockBackend, MockReply};
pub use session::{SessionEngine, SessionState, Turn};
pub use store::{Session, SessionId};
pub use types::{
    CellValue, ChartData, Message, MessageRole, PlotResponse, QueryIntent, QueryOperation,
    QueryRequest, Record, Series,
};

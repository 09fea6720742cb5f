//! CLI command definitions.
//!
//! Every command binds one session to the table named by `--table` and
//! drives it through the query service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use sheetchat_core::{BackendConfig, ExportArtifact, HttpBackend, SessionEngine};

pub mod ask;
pub mod chat;

/// SheetChat - ask questions about a registered table
#[derive(Parser)]
#[command(name = "sheetchat")]
#[command(version, about = "SheetChat - ask questions about a registered table")]
#[command(long_about = r#"
SheetChat answers free-text questions about one previously registered table.

Utterances are routed by keyword:
  plot      → chart of the selected columns
  show      → table of matching rows
  download  → spreadsheet export of the whole table
  otherwise → prose answer

The query service URL is taken from --api-url, then .sheetchat/settings.json,
then the NODE_API environment variable.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Registered table to query
    #[arg(short, long, global = true, env = "SHEETCHAT_TABLE")]
    pub table: Option<String>,

    /// Base URL of the query service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Directory where downloaded spreadsheets are written
    #[arg(long, global = true, default_value = ".")]
    pub export_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive conversation
    Chat(chat::ChatArgs),

    /// Ask a single question and exit
    Ask(ask::AskArgs),
}

impl ConnectionArgs {
    /// Resolve the backend configuration.
    pub fn backend_config(&self) -> Result<BackendConfig> {
        let mut config = match &self.api_url {
            Some(url) => BackendConfig::new(url.as_str()),
            None => {
                let cwd = std::env::current_dir()?;
                BackendConfig::load(&cwd)?
            }
        };
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Build an engine bound to `--table`.
    pub fn bound_engine(&self) -> Result<SessionEngine<HttpBackend>> {
        let config = self.backend_config()?;
        debug!(base_url = %config.base_url, "Using query service");

        let table = self
            .table
            .as_deref()
            .context("No table given; pass --table or set SHEETCHAT_TABLE")?;

        let mut engine = SessionEngine::new(HttpBackend::new(config)?);
        engine.bind(table)?;
        Ok(engine)
    }
}

/// Write an export artifact into `dir` and return its path.
pub fn save_export(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = artifact.bytes.len(), "Spreadsheet saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_export() {
        let temp = tempdir().unwrap();
        let artifact = ExportArtifact {
            file_name: "orders.xlsx".to_string(),
            bytes: b"PK\x03\x04".to_vec(),
        };

        let path = save_export(&temp.path().join("out"), &artifact).unwrap();
        assert_eq!(path.file_name().unwrap(), "orders.xlsx");
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn test_api_url_flag_wins() {
        let args = ConnectionArgs {
            table: Some("orders".to_string()),
            api_url: Some("http://localhost:5000/".to_string()),
            timeout_secs: Some(3),
            export_dir: PathBuf::from("."),
        };
        let config = args.backend_config().unwrap();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_missing_table() {
        let args = ConnectionArgs {
            table: None,
            api_url: Some("http://localhost:5000".to_string()),
            timeout_secs: None,
            export_dir: PathBuf::from("."),
        };
        assert!(args.bound_engine().is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "sheetchat",
            "--table",
            "orders",
            "--api-url",
            "http://localhost:5000",
            "ask",
            "how many rows?",
        ])
        .unwrap();
        assert_eq!(cli.connection.table.as_deref(), Some("orders"));
        assert!(matches!(cli.command, Commands::Ask(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Cli::try_parse_from([
            "sheetchat",
            "--timeout-secs",
            "0",
            "ask",
            "how many rows?",
        ]);
        assert!(result.is_err());
    }
}

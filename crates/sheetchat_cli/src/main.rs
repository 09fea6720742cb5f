//! SheetChat CLI - terminal front end for the query session engine.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or session contract violation
//! - 3: Configuration error

use std::process::ExitCode;

use clap::Parser;
use sheetchat_core::ChatError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod render;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "sheetchat=debug" } else { "sheetchat=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}", default_level)));

    // Already-initialized logging is not an error.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Chat(args) => commands::chat::execute(&cli.connection, args).await,
        Commands::Ask(args) => commands::ask::execute(&cli.connection, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<ChatError>() {
        Some(ChatError::Config(_)) => ExitCodes::CONFIG_ERROR,
        Some(ChatError::EmptyTableName)
        | Some(ChatError::AlreadyBound(_))
        | Some(ChatError::SessionNotBound) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::GENERAL_ERROR,
    }
}

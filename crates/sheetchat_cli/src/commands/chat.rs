//! Chat command - interactive conversation over stdin.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{save_export, ConnectionArgs};
use crate::render::{render_history, render_message, render_session_header};

#[derive(Args)]
pub struct ChatArgs {
    /// Prompt shown before each input line
    #[arg(long, default_value = "> ")]
    prompt: String,
}

/// Input that is handled locally instead of being sent as an utterance.
#[derive(Debug, PartialEq, Eq)]
enum LocalCommand {
    History,
    Quit,
}

fn parse_local(line: &str) -> Option<LocalCommand> {
    match line.trim() {
        "/history" => Some(LocalCommand::History),
        "/quit" | "/exit" => Some(LocalCommand::Quit),
        _ => None,
    }
}

pub async fn execute(connection: &ConnectionArgs, args: ChatArgs) -> Result<()> {
    let mut engine = connection.bound_engine()?;
    if let Some(table) = engine.table_name() {
        println!("Chatting with table '{}'. Type /history to replay, /quit to leave.", table);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", args.prompt);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_local(&line) {
            Some(LocalCommand::Quit) => break,
            Some(LocalCommand::History) => {
                if let Some(session) = engine.session() {
                    println!("{}", render_session_header(session));
                }
                println!("{}", render_history(engine.replay()));
                continue;
            }
            None => {}
        }

        // The next line is only read once this turn is fully resolved.
        let turn = engine.submit_utterance(&line).await?;
        println!("{}", render_message(&turn.reply));

        if let Some(artifact) = &turn.export {
            match save_export(&connection.export_dir, artifact) {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => warn!(error = %e, "Could not save spreadsheet"),
            }
        }
    }

    Ok(())
}

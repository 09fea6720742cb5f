//! Ask command - one question, one answer.

use anyhow::Result;
use clap::Args;

use super::{save_export, ConnectionArgs};
use crate::render::render_message;

#[derive(Args)]
pub struct AskArgs {
    /// The question to ask
    question: String,

    /// Print the whole history as JSON instead of rendered text
    #[arg(long)]
    json: bool,
}

pub async fn execute(connection: &ConnectionArgs, args: AskArgs) -> Result<()> {
    let mut engine = connection.bound_engine()?;
    let turn = engine.submit_utterance(&args.question).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(engine.replay())?);
    } else {
        println!("{}", render_message(&turn.reply));
    }

    if let Some(artifact) = &turn.export {
        let path = save_export(&connection.export_dir, artifact)?;
        println!("Saved {}", path.display());
    }

    if turn.recovered {
        anyhow::bail!("Query service request failed");
    }
    Ok(())
}

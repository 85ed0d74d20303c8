//! Recompute previous/next pointers for records from the shell, without
//! going through the webhook.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use sequencer_common::Config;
use sequencer_engine::{NotionStore, Outcome, Sequencer};
use sequencer_server::init_tracing;

#[derive(Parser)]
#[command(name = "sequence", about = "Relink meeting records to their cohort neighbours")]
struct Cli {
    /// Record (page) ids to resequence, processed in order
    #[arg(required = true)]
    record_ids: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.json_logs)?;

    let sequencer = Sequencer::new(Arc::new(NotionStore::from_config(&config)));

    let mut failures = 0usize;
    for record_id in &cli.record_ids {
        match sequencer.sequence(record_id).await {
            Ok(Outcome::Linked { previous, next }) => println!(
                "{record_id}: linked previous={} next={}",
                previous.as_deref().unwrap_or("-"),
                next.as_deref().unwrap_or("-"),
            ),
            Ok(outcome) => println!("{record_id}: {}", outcome.label()),
            Err(e) => {
                failures += 1;
                eprintln!("{record_id}: error: {e}");
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

//! docmirror command-line entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use docmirror::channel::{Channel, WebhookChannel};
use docmirror::logging::setup_logging;
use docmirror::store::StorageBackend;
use docmirror::{preview, Args, Cli, Command, Mirror, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.args.log_level, &cli.args.log_format)?;

    match cli.command() {
        Command::Sync => sync(&cli.args).await,
        Command::Chunk => chunk(&cli.args).await,
    }
}

async fn sync(args: &Args) -> Result<()> {
    // Resolve everything before the first request goes out.
    let config = args.mirror_config()?;
    let storage = args.storage_config()?;
    let webhook = args.webhook_config()?;

    let channel: Arc<dyn Channel> =
        Arc::new(WebhookChannel::with_config(webhook).context("Failed to create webhook client")?);
    let store = StorageBackend::from_config(storage, channel.clone());

    let mirror = Mirror::new(channel, store, config);
    match mirror.run().await.context("Mirror run failed")? {
        RunOutcome::Unchanged => info!("channel is up to date"),
        RunOutcome::Published { ids, .. } => info!(count = ids.len(), "document published"),
    }
    Ok(())
}

async fn chunk(args: &Args) -> Result<()> {
    let config = args.mirror_config()?;
    let blocks = preview(&config).await?;
    for block in &blocks {
        println!("{}\t{}", block.index + 1, block.len());
    }
    Ok(())
}

//! The Mirror: one end-to-end run.
//!
//! A run reads and chunks the document, loads the identifiers of the last
//! successful run, publishes, writes the output file and saves the new
//! identifiers. Sizing errors surface before the channel or the store is
//! touched.

use std::path::Path;

use docmirror_channel::Channel;
use docmirror_core::{Block, Chunker, ChunkerConfig, MessageId};
use docmirror_store::{IdFormat, IdentifierStore, SaveOutcome};

use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::publish::{CleanupReport, PublishResult, Publisher};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The channel already mirrors the document.
    Unchanged,
    /// The document was republished and the new identifiers saved.
    Published {
        ids: Vec<MessageId>,
        retired: CleanupReport,
        saved: SaveOutcome,
    },
}

/// Mirrors one document onto one channel.
pub struct Mirror<C: Channel, S: IdentifierStore> {
    publisher: Publisher<C>,
    store: S,
    config: MirrorConfig,
}

impl<C: Channel, S: IdentifierStore> Mirror<C, S> {
    pub fn new(channel: C, store: S, config: MirrorConfig) -> Self {
        Self {
            publisher: Publisher::new(channel, config.publish),
            store,
            config,
        }
    }

    pub fn channel(&self) -> &C {
        self.publisher.channel()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run once.
    ///
    /// A failed send is an error even though the partial publish was rolled
    /// back. So is a failed save: the messages are posted, but the next run
    /// will not be able to retire them.
    pub async fn run(&self) -> Result<RunOutcome> {
        let blocks = read_blocks(&self.config.document, &self.config.chunker).await?;

        let prior = self.store.load().await;
        tracing::info!(
            method = %self.store.method(),
            prior = prior.len(),
            blocks = blocks.len(),
            "starting mirror run"
        );

        let (ids, retired) = match self.publisher.publish(&blocks, &prior).await? {
            PublishResult::Unchanged => return Ok(RunOutcome::Unchanged),
            PublishResult::Failed { reason, rollback } => {
                if !rollback.is_clean() {
                    tracing::warn!(
                        orphaned = rollback.failed.len(),
                        "some messages from this run could not be deleted"
                    );
                }
                return Err(MirrorError::PublishFailed(reason));
            }
            PublishResult::Published { ids, retired } => (ids, retired),
        };

        if !retired.is_clean() {
            tracing::warn!(
                stale = retired.failed.len(),
                "some previous messages could not be deleted"
            );
        }

        if let Some(path) = &self.config.output_file {
            write_output(path, &ids).await?;
        }

        let saved = self.store.save(&ids).await?;
        match &saved {
            SaveOutcome::Saved => tracing::info!(count = ids.len(), "saved message ids"),
            SaveOutcome::NotSaved => {
                tracing::info!("storage method keeps nothing, message ids not saved")
            }
            SaveOutcome::Relocated { message_id } => {
                tracing::warn!(tracking_message = %message_id, "message ids saved to a new tracking message")
            }
        }

        Ok(RunOutcome::Published {
            ids,
            retired,
            saved,
        })
    }
}

/// Read `path` and chunk it.
pub async fn read_blocks(path: &Path, chunker: &ChunkerConfig) -> Result<Vec<Block>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MirrorError::ReadDocument {
            path: path.display().to_string(),
            source,
        })?;

    let blocks = Chunker::new(*chunker).chunk(&text)?;
    for block in &blocks {
        tracing::debug!(block = block.index, chars = block.len(), text = %block.text, "chunked block");
    }
    Ok(blocks)
}

/// Chunk the configured document without touching the channel.
pub async fn preview(config: &MirrorConfig) -> Result<Vec<Block>> {
    let blocks = read_blocks(&config.document, &config.chunker).await?;
    for block in &blocks {
        tracing::info!(block = block.index, chars = block.len(), "block");
    }
    Ok(blocks)
}

async fn write_output(path: &Path, ids: &[MessageId]) -> Result<()> {
    tokio::fs::write(path, IdFormat::Lines.encode(ids))
        .await
        .map_err(|source| MirrorError::WriteOutput {
            path: path.display().to_string(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "wrote output file");
    Ok(())
}

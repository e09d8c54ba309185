//! The Publisher: brings the channel in line with a block sequence.
//!
//! A publish is a small saga:
//!
//! 1. fetch every previously posted message (bounded, concurrent, ordered)
//! 2. compare against the blocks; stop if nothing changed
//! 3. send every block, one after another, collecting the new ids
//! 4. on the first failed send, delete what was sent so far and give up
//! 5. otherwise delete the previously posted messages
//!
//! Deletes are best-effort. Their failures are logged and reported in a
//! [`CleanupReport`] but never change the outcome.

use futures::stream::{self, StreamExt, TryStreamExt};

use docmirror_channel::{Channel, MessageOptions};
use docmirror_core::{detect_change, Block, ChangeReason, Message, MessageId};

use crate::error::PublishError;

/// Default bound on concurrent fetch and delete requests.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Configuration for the Publisher.
#[derive(Debug, Clone, Copy)]
pub struct PublishConfig {
    /// Maximum number of fetch or delete requests in flight.
    pub max_concurrency: usize,
    /// Options applied to every sent block.
    pub message_options: MessageOptions,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            message_options: MessageOptions::quiet(),
        }
    }
}

/// Outcome of a best-effort batch delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Messages that were deleted.
    pub deleted: Vec<MessageId>,
    /// Messages that could not be deleted, with the reason.
    pub failed: Vec<(MessageId, String)>,
}

impl CleanupReport {
    /// Whether every delete succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    /// The posted messages already match the blocks; nothing was sent.
    Unchanged,
    /// Every block was sent and the previous messages were retired.
    Published {
        ids: Vec<MessageId>,
        retired: CleanupReport,
    },
    /// A send failed; whatever was sent in this attempt was rolled back and
    /// the previous messages were left alone.
    Failed {
        reason: String,
        rollback: CleanupReport,
    },
}

/// Publishes block sequences to a channel.
pub struct Publisher<C: Channel> {
    channel: C,
    config: PublishConfig,
}

impl<C: Channel> Publisher<C> {
    /// Create a new publisher.
    pub fn new(channel: C, config: PublishConfig) -> Self {
        Self { channel, config }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Bring the channel in line with `blocks`.
    ///
    /// `prior` is the identifier sequence persisted by the last successful
    /// run. A prior message that cannot be fetched is an error; it is never
    /// read as "nothing posted yet", which would leave it on the channel.
    pub async fn publish(
        &self,
        blocks: &[Block],
        prior: &[MessageId],
    ) -> Result<PublishResult, PublishError> {
        let existing = self.fetch_all(prior).await?;

        match detect_change(&existing, blocks) {
            None => {
                tracing::info!(blocks = blocks.len(), "nothing to send, messages are equal");
                return Ok(PublishResult::Unchanged);
            }
            Some(ChangeReason::CountMismatch { existing, blocks }) => {
                tracing::info!(existing, blocks, "number of blocks changed, sending messages");
            }
            Some(ChangeReason::ContentDiffers { index }) => {
                tracing::info!(block = index, "block differs, sending messages");
                tracing::debug!(
                    read = %blocks[index].text,
                    fetched = %existing[index].content,
                    "differing block"
                );
            }
        }

        let mut sent = Vec::with_capacity(blocks.len());
        for block in blocks {
            tracing::info!(block = block.index, chars = block.len(), "sending message");
            match self.channel.send(&block.text, self.config.message_options).await {
                Ok(id) => sent.push(id),
                Err(e) => {
                    tracing::error!(block = block.index, error = %e, "couldn't send message");
                    let reason = format!(
                        "couldn't send block #{} of {}: {}",
                        block.index + 1,
                        blocks.len(),
                        e
                    );
                    tracing::info!(count = sent.len(), "deleting messages sent in this run");
                    let rollback = self.delete_all(&sent).await;
                    return Ok(PublishResult::Failed { reason, rollback });
                }
            }
        }

        tracing::info!(
            ids = %sent.iter().map(MessageId::as_str).collect::<Vec<_>>().join(","),
            "messages sent"
        );

        let retired = self.delete_all(prior).await;
        Ok(PublishResult::Published { ids: sent, retired })
    }

    /// Fetch `ids`, keeping their order.
    async fn fetch_all(&self, ids: &[MessageId]) -> Result<Vec<Message>, PublishError> {
        stream::iter(ids)
            .map(|id| async move {
                self.channel
                    .fetch(id)
                    .await
                    .map_err(|source| PublishError::Fetch {
                        id: id.clone(),
                        source,
                    })
            })
            .buffered(self.concurrency())
            .try_collect()
            .await
    }

    /// Delete `ids` concurrently, recording rather than raising failures.
    async fn delete_all(&self, ids: &[MessageId]) -> CleanupReport {
        let results: Vec<_> = stream::iter(ids)
            .map(|id| async move { (id, self.channel.delete(id).await) })
            .buffer_unordered(self.concurrency())
            .collect()
            .await;

        let mut report = CleanupReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.deleted.push(id.clone()),
                Err(e) => {
                    tracing::warn!(message = %id, error = %e, "couldn't delete message");
                    report.failed.push((id.clone(), e.to_string()));
                }
            }
        }
        report
    }

    fn concurrency(&self) -> usize {
        self.config.max_concurrency.max(1)
    }
}

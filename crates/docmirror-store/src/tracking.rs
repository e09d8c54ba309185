//! The `tracking-message` storage method: ids kept in a message on the
//! mirrored channel itself.
//!
//! The tracking message holds the ids as a comma-separated list. Saving
//! edits it in place. When that is impossible (no id configured, or the
//! message is gone) a new tracking message is posted instead; its id is only
//! reported, never stored, so the configuration has to be updated by hand
//! before the next run can find it.

use std::sync::Arc;

use async_trait::async_trait;

use docmirror_channel::{Channel, MessageOptions};
use docmirror_core::MessageId;

use crate::config::StorageMethod;
use crate::error::{Result, StoreError};
use crate::traits::{IdFormat, IdentifierStore, SaveOutcome};

/// Store that keeps the ids in a dedicated channel message.
pub struct TrackingMessageStore {
    channel: Arc<dyn Channel>,
    message_id: Option<MessageId>,
}

impl TrackingMessageStore {
    pub fn new(channel: Arc<dyn Channel>, message_id: Option<MessageId>) -> Self {
        Self {
            channel,
            message_id,
        }
    }

    pub fn message_id(&self) -> Option<&MessageId> {
        self.message_id.as_ref()
    }
}

#[async_trait]
impl IdentifierStore for TrackingMessageStore {
    fn method(&self) -> StorageMethod {
        StorageMethod::TrackingMessage
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        let id = self.message_id.as_ref().ok_or(StoreError::MissingOption {
            method: "tracking-message",
            option: "a tracking message id",
        })?;
        let message = self.channel.fetch(id).await?;
        Ok(IdFormat::CommaList.decode(&message.content))
    }

    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome> {
        let content = IdFormat::CommaList.encode(ids);

        match &self.message_id {
            Some(id) => match self.channel.edit(id, &content, MessageOptions::quiet()).await {
                Ok(_) => {
                    tracing::info!(tracking_message = %id, count = ids.len(), "updated tracking message");
                    return Ok(SaveOutcome::Saved);
                }
                Err(e) => {
                    tracing::warn!(
                        tracking_message = %id,
                        error = %e,
                        "couldn't edit tracking message, sending a new one"
                    );
                }
            },
            None => {
                tracing::warn!("no tracking message id configured, sending a new one");
            }
        }

        let message_id = self.channel.send(&content, MessageOptions::quiet()).await?;
        tracing::error!(
            tracking_message = %message_id,
            "sent a new tracking message; set the tracking message id to {} so the next run can find it",
            message_id
        );
        Ok(SaveOutcome::Relocated { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_channel::MemoryChannel;

    fn ids(raw: &[&str]) -> Vec<MessageId> {
        raw.iter().map(|s| MessageId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_tracking_round_trip() {
        let channel = Arc::new(MemoryChannel::new());
        let tracking = channel.insert("").await;
        let store = TrackingMessageStore::new(channel.clone(), Some(tracking.clone()));

        let list = ids(&["11", "12"]);
        assert_eq!(store.save(&list).await.unwrap(), SaveOutcome::Saved);
        assert_eq!(store.load().await, list);

        assert_eq!(channel.content_of(&tracking).await.as_deref(), Some("11, 12"));
        assert_eq!(channel.last_options().await, Some(MessageOptions::quiet()));
    }

    #[tokio::test]
    async fn test_missing_tracking_message_relocates() {
        let channel = Arc::new(MemoryChannel::new());
        let gone = MessageId::from("404");
        let store = TrackingMessageStore::new(channel.clone(), Some(gone));

        let outcome = store.save(&ids(&["1", "2"])).await.unwrap();
        let new_id = match outcome {
            SaveOutcome::Relocated { message_id } => message_id,
            other => panic!("expected Relocated, got {:?}", other),
        };

        assert_eq!(channel.content_of(&new_id).await.as_deref(), Some("1, 2"));
        // The configured id is left as it was.
        assert_eq!(store.message_id(), Some(&MessageId::from("404")));
    }

    #[tokio::test]
    async fn test_unconfigured_store_sends_new_message() {
        let channel = Arc::new(MemoryChannel::new());
        let store = TrackingMessageStore::new(channel.clone(), None);

        assert!(store.load().await.is_empty());
        let outcome = store.save(&ids(&["3"])).await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Relocated { .. }));
        assert_eq!(channel.counts().await.send, 1);
        assert_eq!(channel.counts().await.edit, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_loads_empty() {
        let channel = Arc::new(MemoryChannel::new());
        let tracking = channel.insert("1, 2").await;
        channel.fail_fetch(&tracking).await;

        let store = TrackingMessageStore::new(channel, Some(tracking));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_send_failure_fails_save() {
        let channel = Arc::new(MemoryChannel::new());
        channel.fail_send_attempt(1).await;
        let store = TrackingMessageStore::new(channel, None);

        let err = store.save(&ids(&["1"])).await.unwrap_err();
        assert!(matches!(err, StoreError::Channel(_)));
    }
}

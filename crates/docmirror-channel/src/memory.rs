//! In-memory implementation of the Channel trait.
//!
//! This is primarily for testing. Messages live in a vector in posting
//! order; every call is counted and individual calls can be made to fail.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docmirror_core::{Message, MessageId};

use crate::error::{ChannelError, Result};
use crate::traits::{Channel, MessageOptions};

/// First identifier handed out. Fixed width keeps ids sortable as strings.
const FIRST_ID: u64 = 1_000_000;

/// Number of calls made to each channel operation, failed ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch: usize,
    pub send: usize,
    pub edit: usize,
    pub delete: usize,
}

impl CallCounts {
    /// Calls that change channel state.
    pub fn mutations(&self) -> usize {
        self.send + self.edit + self.delete
    }
}

/// In-memory channel. Thread-safe via an async Mutex.
pub struct MemoryChannel {
    inner: Mutex<MemoryChannelInner>,
}

#[derive(Default)]
struct MemoryChannelInner {
    /// Live messages in posting order.
    messages: Vec<Message>,
    next_id: u64,
    counts: CallCounts,

    /// Every id returned by a successful send.
    sent: Vec<MessageId>,
    /// Every id removed by a successful delete.
    deleted: Vec<MessageId>,
    /// Last options seen on send/edit.
    last_options: Option<MessageOptions>,

    /// 1-based send attempt numbers that fail.
    failing_sends: HashSet<usize>,
    failing_fetches: HashSet<MessageId>,
    failing_edits: HashSet<MessageId>,
    failing_deletes: HashSet<MessageId>,
}

impl MemoryChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryChannelInner {
                next_id: FIRST_ID,
                ..Default::default()
            }),
        }
    }

    /// Post a message directly, bypassing counters and fault injection.
    pub async fn insert(&self, content: impl Into<String>) -> MessageId {
        let mut inner = self.inner.lock().await;
        inner.post(content.into())
    }

    /// Make the `attempt`-th call to `send` (1-based) fail.
    pub async fn fail_send_attempt(&self, attempt: usize) {
        self.inner.lock().await.failing_sends.insert(attempt);
    }

    /// Make every fetch of `id` fail.
    pub async fn fail_fetch(&self, id: &MessageId) {
        self.inner.lock().await.failing_fetches.insert(id.clone());
    }

    /// Make every edit of `id` fail.
    pub async fn fail_edit(&self, id: &MessageId) {
        self.inner.lock().await.failing_edits.insert(id.clone());
    }

    /// Make every delete of `id` fail.
    pub async fn fail_delete(&self, id: &MessageId) {
        self.inner.lock().await.failing_deletes.insert(id.clone());
    }

    /// Call counts so far.
    pub async fn counts(&self) -> CallCounts {
        self.inner.lock().await.counts
    }

    /// Zero the call counters and the sent/deleted logs.
    pub async fn reset_counts(&self) {
        let mut inner = self.inner.lock().await;
        inner.counts = CallCounts::default();
        inner.sent.clear();
        inner.deleted.clear();
    }

    /// Ids returned by successful sends, in order.
    pub async fn sent(&self) -> Vec<MessageId> {
        self.inner.lock().await.sent.clone()
    }

    /// Ids removed by successful deletes, in completion order.
    pub async fn deleted(&self) -> Vec<MessageId> {
        self.inner.lock().await.deleted.clone()
    }

    /// Live messages in posting order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.lock().await.messages.clone()
    }

    /// Content of a live message.
    pub async fn content_of(&self, id: &MessageId) -> Option<String> {
        self.inner
            .lock()
            .await
            .find(id)
            .map(|m| m.content.clone())
    }

    pub async fn last_options(&self) -> Option<MessageOptions> {
        self.inner.lock().await.last_options
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChannelInner {
    fn post(&mut self, content: String) -> MessageId {
        let id = MessageId::new(self.next_id.to_string());
        self.next_id += 1;
        self.messages.push(Message {
            id: id.clone(),
            content,
        });
        id
    }

    fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn fetch(&self, id: &MessageId) -> Result<Message> {
        let mut inner = self.inner.lock().await;
        inner.counts.fetch += 1;

        if inner.failing_fetches.contains(id) {
            return Err(ChannelError::Injected(format!("fetch {}", id)));
        }

        inner
            .find(id)
            .cloned()
            .ok_or_else(|| ChannelError::NotFound(id.clone()))
    }

    async fn send(&self, content: &str, options: MessageOptions) -> Result<MessageId> {
        let mut inner = self.inner.lock().await;
        inner.counts.send += 1;
        inner.last_options = Some(options);

        let attempt = inner.counts.send;
        if inner.failing_sends.contains(&attempt) {
            return Err(ChannelError::Injected(format!("send #{}", attempt)));
        }

        let id = inner.post(content.to_string());
        inner.sent.push(id.clone());
        Ok(id)
    }

    async fn edit(
        &self,
        id: &MessageId,
        content: &str,
        options: MessageOptions,
    ) -> Result<MessageId> {
        let mut inner = self.inner.lock().await;
        inner.counts.edit += 1;
        inner.last_options = Some(options);

        if inner.failing_edits.contains(id) {
            return Err(ChannelError::Injected(format!("edit {}", id)));
        }

        match inner.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                message.content = content.to_string();
                Ok(id.clone())
            }
            None => Err(ChannelError::NotFound(id.clone())),
        }
    }

    async fn delete(&self, id: &MessageId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.counts.delete += 1;

        if inner.failing_deletes.contains(id) {
            return Err(ChannelError::Injected(format!("delete {}", id)));
        }

        let before = inner.messages.len();
        inner.messages.retain(|m| &m.id != id);
        if inner.messages.len() == before {
            return Err(ChannelError::NotFound(id.clone()));
        }

        inner.deleted.push(id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_channel_send_fetch_delete() {
        let channel = MemoryChannel::new();

        let id = channel.send("hello", MessageOptions::quiet()).await.unwrap();
        let message = channel.fetch(&id).await.unwrap();
        assert_eq!(message.content, "hello");

        channel.delete(&id).await.unwrap();
        assert!(matches!(
            channel.fetch(&id).await,
            Err(ChannelError::NotFound(_))
        ));

        let counts = channel.counts().await;
        assert_eq!(counts.send, 1);
        assert_eq!(counts.fetch, 2);
        assert_eq!(counts.delete, 1);
    }

    #[tokio::test]
    async fn test_memory_channel_edit() {
        let channel = MemoryChannel::new();
        let id = channel.insert("before").await;

        channel
            .edit(&id, "after", MessageOptions::quiet())
            .await
            .unwrap();
        assert_eq!(channel.content_of(&id).await.as_deref(), Some("after"));
        assert_eq!(channel.counts().await.edit, 1);
    }

    #[tokio::test]
    async fn test_memory_channel_injected_send_failure() {
        let channel = MemoryChannel::new();
        channel.fail_send_attempt(2).await;

        assert!(channel.send("a", MessageOptions::quiet()).await.is_ok());
        assert!(channel.send("b", MessageOptions::quiet()).await.is_err());
        assert!(channel.send("c", MessageOptions::quiet()).await.is_ok());

        assert_eq!(channel.sent().await.len(), 2);
        assert_eq!(channel.counts().await.send, 3);
    }

    #[tokio::test]
    async fn test_memory_channel_insert_is_not_counted() {
        let channel = MemoryChannel::new();
        let a = channel.insert("a").await;
        let b = channel.insert("b").await;

        assert!(a < b);
        assert_eq!(channel.counts().await, CallCounts::default());
        assert_eq!(channel.messages().await.len(), 2);
    }
}

//! Channel trait: the abstract interface to a messaging destination.

use std::sync::Arc;

use async_trait::async_trait;
use docmirror_core::{Message, MessageId};

use crate::error::Result;

/// Per-message delivery options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageOptions {
    /// Do not expand `@mentions` (and so do not notify anyone).
    pub suppress_mentions: bool,
}

impl MessageOptions {
    /// Options for mirrored content: nobody gets pinged.
    pub fn quiet() -> Self {
        Self {
            suppress_mentions: true,
        }
    }
}

/// A size-limited messaging destination addressed by message identifier.
///
/// Implementations must be thread-safe (Send + Sync); the publisher issues
/// fetches and deletes concurrently.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Fetch a posted message.
    async fn fetch(&self, id: &MessageId) -> Result<Message>;

    /// Post a new message and return its identifier.
    async fn send(&self, content: &str, options: MessageOptions) -> Result<MessageId>;

    /// Replace the content of a posted message.
    async fn edit(&self, id: &MessageId, content: &str, options: MessageOptions)
        -> Result<MessageId>;

    /// Delete a posted message.
    async fn delete(&self, id: &MessageId) -> Result<()>;
}

#[async_trait]
impl<C: Channel + ?Sized> Channel for Arc<C> {
    async fn fetch(&self, id: &MessageId) -> Result<Message> {
        (**self).fetch(id).await
    }

    async fn send(&self, content: &str, options: MessageOptions) -> Result<MessageId> {
        (**self).send(content, options).await
    }

    async fn edit(
        &self,
        id: &MessageId,
        content: &str,
        options: MessageOptions,
    ) -> Result<MessageId> {
        (**self).edit(id, content, options).await
    }

    async fn delete(&self, id: &MessageId) -> Result<()> {
        (**self).delete(id).await
    }
}

//! IdentifierStore trait: the abstract interface for identifier persistence.

use std::sync::Arc;

use async_trait::async_trait;
use docmirror_core::MessageId;

use crate::config::StorageMethod;
use crate::error::Result;

/// Result of saving an identifier list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The list was persisted where the next run will look for it.
    Saved,
    /// The store does not persist anything.
    NotSaved,
    /// The list was persisted in a newly created tracking message. The next
    /// run only finds it once `message_id` is configured.
    Relocated { message_id: MessageId },
}

/// Serialization format of a stored identifier list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    /// One identifier per line.
    Lines,
    /// Identifiers separated by `", "`.
    CommaList,
}

impl IdFormat {
    fn separator(self) -> &'static str {
        match self {
            IdFormat::Lines => "\n",
            IdFormat::CommaList => ", ",
        }
    }

    pub fn encode(self, ids: &[MessageId]) -> String {
        ids.iter()
            .map(MessageId::as_str)
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    /// Decode a stored list. Surrounding whitespace and blank entries are
    /// ignored, so an empty document decodes to an empty list.
    pub fn decode(self, raw: &str) -> Vec<MessageId> {
        raw.trim()
            .split(self.separator())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(MessageId::from)
            .collect()
    }
}

/// Persistence of the ordered list of posted message identifiers.
///
/// # Design Notes
///
/// - `try_load` reports transport errors; `load` turns them into a warning
///   and an empty list, which the publisher treats as "nothing posted yet".
/// - `save` must fail loudly. Losing the list leaves stale messages on the
///   channel that no later run can retire.
/// - `load` and `save` of one implementation must agree on [`IdFormat`].
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Which storage method this is, for logging.
    fn method(&self) -> StorageMethod;

    /// Read the stored identifiers.
    async fn try_load(&self) -> Result<Vec<MessageId>>;

    /// Persist `ids`, replacing whatever was stored before.
    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome>;

    /// Read the stored identifiers, treating any failure as "none".
    async fn load(&self) -> Vec<MessageId> {
        match self.try_load().await {
            Ok(ids) => {
                tracing::debug!(method = %self.method(), count = ids.len(), "loaded message ids");
                ids
            }
            Err(e) => {
                tracing::warn!(
                    method = %self.method(),
                    error = %e,
                    "couldn't read stored message ids, continuing anyway"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<S: IdentifierStore + ?Sized> IdentifierStore for Arc<S> {
    fn method(&self) -> StorageMethod {
        (**self).method()
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        (**self).try_load().await
    }

    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome> {
        (**self).save(ids).await
    }

    async fn load(&self) -> Vec<MessageId> {
        (**self).load().await
    }
}

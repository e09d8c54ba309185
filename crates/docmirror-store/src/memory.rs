//! In-memory implementation of the IdentifierStore trait.
//!
//! This is primarily for testing. It keeps the last saved list and counts
//! saves; all data is lost when the store is dropped.

use async_trait::async_trait;
use tokio::sync::RwLock;

use docmirror_core::MessageId;

use crate::config::StorageMethod;
use crate::error::{Result, StoreError};
use crate::traits::{IdentifierStore, SaveOutcome};

/// In-memory store implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    ids: Vec<MessageId>,
    saves: usize,
    fail_saves: bool,
    fail_loads: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `ids`.
    pub fn with_ids(ids: Vec<MessageId>) -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                ids,
                ..Default::default()
            }),
        }
    }

    /// The currently stored list.
    pub async fn ids(&self) -> Vec<MessageId> {
        self.inner.read().await.ids.clone()
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        self.inner.read().await.saves
    }

    /// Make every subsequent save fail.
    pub async fn fail_saves(&self) {
        self.inner.write().await.fail_saves = true;
    }

    /// Make every subsequent load fail.
    pub async fn fail_loads(&self) {
        self.inner.write().await.fail_loads = true;
    }
}

#[async_trait]
impl IdentifierStore for MemoryStore {
    fn method(&self) -> StorageMethod {
        StorageMethod::Memory
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        let inner = self.inner.read().await;
        if inner.fail_loads {
            return Err(StoreError::InvalidData("injected load failure".into()));
        }
        Ok(inner.ids.clone())
    }

    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome> {
        let mut inner = self.inner.write().await;
        if inner.fail_saves {
            return Err(StoreError::InvalidData("injected save failure".into()));
        }
        inner.ids = ids.to_vec();
        inner.saves += 1;
        Ok(SaveOutcome::Saved)
    }
}

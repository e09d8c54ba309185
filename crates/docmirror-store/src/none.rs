//! The `none` storage method: nothing is remembered between runs.

use async_trait::async_trait;
use docmirror_core::MessageId;

use crate::config::StorageMethod;
use crate::error::Result;
use crate::traits::{IdentifierStore, SaveOutcome};

/// Store that never keeps anything.
///
/// Every run sees an empty history, so every run publishes and nothing is
/// ever retired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneStore;

#[async_trait]
impl IdentifierStore for NoneStore {
    fn method(&self) -> StorageMethod {
        StorageMethod::None
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        Ok(Vec::new())
    }

    async fn save(&self, _ids: &[MessageId]) -> Result<SaveOutcome> {
        Ok(SaveOutcome::NotSaved)
    }
}

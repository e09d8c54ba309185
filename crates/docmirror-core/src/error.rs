//! Error types for docmirror core.

use thiserror::Error;

/// Errors that can occur while chunking a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A single segment does not fit in one message.
    ///
    /// `index` is the 0-based ordinal of the segment; the message reports it
    /// 1-based so it can be matched against the source document by eye.
    #[error(
        "text block #{} is too long ({length} > {limit} characters)\n\
         starts with: {starts_with}...\n\
         ends with: ...{ends_with}",
        .index + 1
    )]
    BlockTooLarge {
        index: usize,
        length: usize,
        limit: usize,
        starts_with: String,
        ends_with: String,
    },
}

/// Result type for chunking.
pub type Result<T> = std::result::Result<T, ChunkError>;

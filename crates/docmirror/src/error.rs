//! Error types for publishing and mirror runs.

use docmirror_channel::ChannelError;
use docmirror_core::{ChunkError, MessageId};
use docmirror_store::StoreError;
use thiserror::Error;

/// Errors that abort a publish before any message is sent.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A previously posted message could not be fetched.
    #[error("couldn't fetch message {id}: {source}")]
    Fetch {
        id: MessageId,
        #[source]
        source: ChannelError,
    },
}

/// Errors that fail a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The document could not be read.
    #[error("couldn't read document {path}: {source}")]
    ReadDocument {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document does not fit the channel's message limit.
    #[error("chunking failed: {0}")]
    Chunk(#[from] ChunkError),

    /// Publishing was aborted before sending.
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// Sending failed part way; sent messages were rolled back.
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// The output file could not be written.
    #[error("couldn't write output file {path}: {source}")]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Saving the new identifiers failed. The messages are posted but the
    /// next run will not know about them.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for mirror runs.
pub type Result<T> = std::result::Result<T, MirrorError>;

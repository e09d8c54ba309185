//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured storage method is not implemented.
    #[error("storage method is unknown: {0}")]
    UnknownStorageMethod(String),

    /// A storage method is missing one of its own options.
    #[error("storage method {method} requires {option}")]
    MissingOption {
        method: &'static str,
        option: &'static str,
    },

    /// A version-control command failed.
    #[error("`{command}` failed (exit={status:?}): {stderr}")]
    Vcs {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// Channel error (tracking-message storage).
    #[error("channel error: {0}")]
    Channel(#[from] docmirror_channel::ChannelError),

    /// Blob storage error.
    #[error("blob error: {0}")]
    Blob(String),

    /// Metadata serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data could not be interpreted.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

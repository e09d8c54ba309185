//! Error types for the channel module.

use docmirror_core::MessageId;
use thiserror::Error;

/// Errors that can occur while talking to a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The request could not be sent or no response was received.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The channel answered with a non-success status.
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The message does not exist (or no longer does).
    #[error("message not found: {0}")]
    NotFound(MessageId),

    /// The webhook URL is malformed.
    #[error("invalid webhook url: {0}")]
    InvalidUrl(String),

    /// Failure injected by a test double.
    #[error("injected failure: {0}")]
    Injected(String),
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;

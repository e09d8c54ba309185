//! # docmirror Core
//!
//! Pure primitives for docmirror: blocks, message identifiers, chunking and
//! change detection.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over document text and already-fetched message content.
//!
//! ## Key Types
//!
//! - [`Block`] - One unit of document text sized to fit one channel message
//! - [`MessageId`] - Opaque identifier assigned by the channel
//! - [`Message`] - A fetched message (identifier plus content)
//! - [`ChangeReason`] - Why a republish is required
//!
//! ## Chunking
//!
//! Documents are split on blank lines and before headings, then greedily
//! merged into blocks of at most [`MAX_MESSAGE_LENGTH`] characters. See the
//! [`chunk`](mod@chunk) module.

pub mod chunk;
pub mod detect;
pub mod error;
pub mod types;

pub use chunk::{chunk, is_heading, split_segments, Chunker, ChunkerConfig};
pub use detect::{detect_change, should_republish, ChangeReason};
pub use error::ChunkError;
pub use types::{Block, Message, MessageId, MAX_MESSAGE_LENGTH};

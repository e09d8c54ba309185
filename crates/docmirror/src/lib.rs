//! # docmirror
//!
//! Keep a long-form text document mirrored onto a run of messages on a
//! size-limited chat channel.
//!
//! ## Overview
//!
//! Each run:
//!
//! - **Chunks** the document into blocks that fit one message each
//! - **Detects** whether the posted messages still match the blocks
//! - **Publishes** the blocks as new messages when they don't, rolling back
//!   a partially sent run and retiring the previous messages otherwise
//! - **Stores** the new message identifiers for the next run
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use docmirror::{Mirror, MirrorConfig, RunOutcome};
//! use docmirror::channel::{Channel, WebhookChannel};
//! use docmirror::store::{StorageBackend, StorageConfig};
//!
//! async fn example() -> docmirror::Result<()> {
//!     let channel: Arc<dyn Channel> =
//!         Arc::new(WebhookChannel::new("https://discord.com/api/webhooks/1/token").unwrap());
//!     let store = StorageBackend::from_config(StorageConfig::None, channel.clone());
//!
//!     let mirror = Mirror::new(channel, store, MirrorConfig::new("README.md"));
//!     match mirror.run().await? {
//!         RunOutcome::Unchanged => println!("up to date"),
//!         RunOutcome::Published { ids, .. } => println!("posted {} messages", ids.len()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docmirror::core` - Blocks, chunking and change detection
//! - `docmirror::channel` - The channel trait and the webhook client
//! - `docmirror::store` - Identifier storage backends

pub mod config;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod publish;

// Re-export component crates
pub use docmirror_channel as channel;
pub use docmirror_core as core;
pub use docmirror_store as store;

// Re-export main types for convenience
pub use config::{Args, Cli, Command, MirrorConfig};
pub use error::{MirrorError, PublishError, Result};
pub use mirror::{preview, read_blocks, Mirror, RunOutcome};
pub use publish::{CleanupReport, PublishConfig, PublishResult, Publisher};

pub use docmirror_core::{Block, Message, MessageId, MAX_MESSAGE_LENGTH};

//! # docmirror Channel
//!
//! The message channel a document is mirrored onto.
//!
//! ## Overview
//!
//! A channel is anything that can post, fetch, edit and delete size-limited
//! text messages by identifier. [`Channel`] is the async trait the publisher
//! and the tracking-message store talk to; [`WebhookChannel`] speaks the
//! Discord webhook REST API and [`MemoryChannel`] is an in-process double
//! with fault injection for tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docmirror_channel::{Channel, MessageOptions, WebhookChannel};
//!
//! async fn example() {
//!     let channel = WebhookChannel::new("https://discord.com/api/webhooks/1/token").unwrap();
//!     let id = channel.send("hello", MessageOptions::quiet()).await.unwrap();
//!     let message = channel.fetch(&id).await.unwrap();
//!     assert_eq!(message.content, "hello");
//!     channel.delete(&id).await.unwrap();
//! }
//! ```

pub mod error;
pub mod memory;
pub mod traits;
pub mod webhook;

pub use error::{ChannelError, Result};
pub use memory::{CallCounts, MemoryChannel};
pub use traits::{Channel, MessageOptions};
pub use webhook::{WebhookChannel, WebhookConfig};

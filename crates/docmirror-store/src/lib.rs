//! # docmirror Store
//!
//! Persistence of the posted message identifiers between runs.
//!
//! ## Overview
//!
//! After a successful publish the ordered list of message identifiers is the
//! only state that has to survive until the next run. The
//! [`IdentifierStore`] trait abstracts where it lives; the supported places
//! form the closed set [`StorageBackend`]:
//!
//! - [`NoneStore`] - nothing is kept; every run starts from scratch
//! - [`VersionedFileStore`] - a file in a git working copy, committed and pushed
//! - [`TrackingMessageStore`] - a dedicated message on the same channel
//! - [`BlobArtifactStore`] - a named blob with a retention period
//!
//! [`MemoryStore`] is an in-memory implementation for tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use docmirror_channel::MemoryChannel;
//! use docmirror_store::{IdentifierStore, StorageBackend, StorageConfig};
//!
//! async fn example() {
//!     let channel = Arc::new(MemoryChannel::new());
//!     let store = StorageBackend::from_config(StorageConfig::None, channel);
//!
//!     let previous = store.load().await;
//!     // ... publish ...
//!     // store.save(&new_ids).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Lenient load**: `load` never fails; a broken transport reads as
//!   "nothing published yet" and is logged as a warning
//! - **Strict save**: `save` errors propagate, a lost id list means the next
//!   run cannot retire stale messages
//! - **Per-variant format**: file-backed variants store one id per line, the
//!   tracking message stores a comma-separated list

pub mod backend;
pub mod blob;
pub mod config;
pub mod error;
pub mod memory;
pub mod none;
pub mod tracking;
pub mod traits;
pub mod versioned;

pub use backend::StorageBackend;
pub use blob::{BlobArtifactStore, BlobFile, BlobTransport, DirBlobTransport};
pub use config::{StorageConfig, StorageMethod};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use none::NoneStore;
pub use tracking::TrackingMessageStore;
pub use traits::{IdFormat, IdentifierStore, SaveOutcome};
pub use versioned::{GitCli, VersionedFileStore, Vcs};

//! Storage method selection and per-method options.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use docmirror_core::MessageId;

use crate::error::StoreError;

/// Default name of the tracked id file.
pub const DEFAULT_ID_FILE: &str = "messageIDs.txt";

/// Default retention of a blob artifact, in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// The supported storage methods.
///
/// `Memory` is reported by the in-process [`MemoryStore`](crate::MemoryStore)
/// and cannot be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMethod {
    None,
    VersionedFile,
    TrackingMessage,
    BlobArtifact,
    Memory,
}

impl StorageMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMethod::None => "none",
            StorageMethod::VersionedFile => "versioned-file",
            StorageMethod::TrackingMessage => "tracking-message",
            StorageMethod::BlobArtifact => "blob-artifact",
            StorageMethod::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMethod {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(StorageMethod::None),
            "git" | "versioned-file" => Ok(StorageMethod::VersionedFile),
            "message" | "tracking-message" => Ok(StorageMethod::TrackingMessage),
            "artifact" | "blob-artifact" => Ok(StorageMethod::BlobArtifact),
            _ => Err(StoreError::UnknownStorageMethod(s.to_string())),
        }
    }
}

/// A storage method together with its own options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    None,
    VersionedFile {
        /// The tracked id file.
        path: PathBuf,
        /// Working copy the file is committed in.
        repo_dir: PathBuf,
        /// Push target; `None` pushes to the branch's upstream.
        remote: Option<String>,
        /// Commit author name; `None` keeps the default.
        author_name: Option<String>,
        /// Commit author email; `None` keeps the default.
        author_email: Option<String>,
    },
    TrackingMessage {
        /// Message holding the id list; `None` makes every save post a new one.
        message_id: Option<MessageId>,
    },
    BlobArtifact {
        /// Directory the blobs are kept in.
        root: PathBuf,
        /// Blob name.
        name: String,
        /// Name of the file inside the blob.
        file_name: String,
        /// Days until the blob expires; 0 keeps it forever.
        retention_days: u32,
    },
}

impl StorageConfig {
    pub fn method(&self) -> StorageMethod {
        match self {
            StorageConfig::None => StorageMethod::None,
            StorageConfig::VersionedFile { .. } => StorageMethod::VersionedFile,
            StorageConfig::TrackingMessage { .. } => StorageMethod::TrackingMessage,
            StorageConfig::BlobArtifact { .. } => StorageMethod::BlobArtifact,
        }
    }
}

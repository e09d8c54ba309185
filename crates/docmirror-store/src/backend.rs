//! The closed set of storage backends.

use std::sync::Arc;

use async_trait::async_trait;

use docmirror_channel::Channel;
use docmirror_core::MessageId;

use crate::blob::{BlobArtifactStore, DirBlobTransport};
use crate::config::{StorageConfig, StorageMethod};
use crate::error::Result;
use crate::none::NoneStore;
use crate::tracking::TrackingMessageStore;
use crate::traits::{IdentifierStore, SaveOutcome};
use crate::versioned::{GitCli, VersionedFileStore};

/// One of the supported storage methods, ready to use.
pub enum StorageBackend {
    None(NoneStore),
    VersionedFile(VersionedFileStore),
    TrackingMessage(TrackingMessageStore),
    BlobArtifact(BlobArtifactStore),
}

impl StorageBackend {
    /// Build the backend described by `config`.
    ///
    /// `channel` is only used by the tracking-message method, which keeps
    /// its list on the mirrored channel.
    pub fn from_config(config: StorageConfig, channel: Arc<dyn Channel>) -> Self {
        match config {
            StorageConfig::None => StorageBackend::None(NoneStore),
            StorageConfig::VersionedFile {
                path,
                repo_dir,
                remote,
                author_name,
                author_email,
            } => {
                let path = if path.is_relative() {
                    repo_dir.join(path)
                } else {
                    path
                };
                let mut git = GitCli::new(repo_dir);
                if let Some(remote) = remote {
                    git = git.with_remote(remote);
                }
                if let Some(name) = author_name {
                    git = git.with_author_name(name);
                }
                if let Some(email) = author_email {
                    git = git.with_author_email(email);
                }
                StorageBackend::VersionedFile(VersionedFileStore::new(path, Arc::new(git)))
            }
            StorageConfig::TrackingMessage { message_id } => {
                StorageBackend::TrackingMessage(TrackingMessageStore::new(channel, message_id))
            }
            StorageConfig::BlobArtifact {
                root,
                name,
                file_name,
                retention_days,
            } => StorageBackend::BlobArtifact(BlobArtifactStore::new(
                Arc::new(DirBlobTransport::new(root)),
                name,
                file_name,
                retention_days,
            )),
        }
    }

    fn as_store(&self) -> &dyn IdentifierStore {
        match self {
            StorageBackend::None(s) => s,
            StorageBackend::VersionedFile(s) => s,
            StorageBackend::TrackingMessage(s) => s,
            StorageBackend::BlobArtifact(s) => s,
        }
    }
}

#[async_trait]
impl IdentifierStore for StorageBackend {
    fn method(&self) -> StorageMethod {
        self.as_store().method()
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        self.as_store().try_load().await
    }

    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome> {
        self.as_store().save(ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ID_FILE;
    use docmirror_channel::MemoryChannel;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn ids(raw: &[&str]) -> Vec<MessageId> {
        raw.iter().map(|s| MessageId::from(*s)).collect()
    }

    #[test]
    fn test_backend_matches_config_method() {
        let channel: Arc<dyn Channel> = Arc::new(MemoryChannel::new());
        let configs = [
            StorageConfig::None,
            StorageConfig::VersionedFile {
                path: PathBuf::from(DEFAULT_ID_FILE),
                repo_dir: PathBuf::from("."),
                remote: None,
                author_name: None,
                author_email: None,
            },
            StorageConfig::TrackingMessage { message_id: None },
            StorageConfig::BlobArtifact {
                root: PathBuf::from("blobs"),
                name: "ids".into(),
                file_name: DEFAULT_ID_FILE.into(),
                retention_days: 1,
            },
        ];

        for config in configs {
            let method = config.method();
            let backend = StorageBackend::from_config(config, channel.clone());
            assert_eq!(backend.method(), method);
        }
    }

    #[test]
    fn test_relative_id_file_resolves_against_repo() {
        let channel: Arc<dyn Channel> = Arc::new(MemoryChannel::new());
        let backend = StorageBackend::from_config(
            StorageConfig::VersionedFile {
                path: PathBuf::from("ids.txt"),
                repo_dir: PathBuf::from("/work/repo"),
                remote: None,
                author_name: None,
                author_email: None,
            },
            channel,
        );
        match backend {
            StorageBackend::VersionedFile(store) => {
                assert_eq!(store.path(), std::path::Path::new("/work/repo/ids.txt"));
            }
            _ => panic!("expected versioned-file backend"),
        }
    }

    #[tokio::test]
    async fn test_backend_round_trips() {
        let dir = TempDir::new().unwrap();
        let channel = Arc::new(MemoryChannel::new());
        let tracking = channel.insert("").await;
        let list = ids(&["900", "901", "902"]);

        let none = StorageBackend::from_config(StorageConfig::None, channel.clone());
        assert_eq!(none.save(&list).await.unwrap(), SaveOutcome::NotSaved);
        assert!(none.load().await.is_empty());

        let tracked = StorageBackend::from_config(
            StorageConfig::TrackingMessage {
                message_id: Some(tracking),
            },
            channel.clone(),
        );
        tracked.save(&list).await.unwrap();
        assert_eq!(tracked.load().await, list);

        let blob = StorageBackend::from_config(
            StorageConfig::BlobArtifact {
                root: dir.path().to_path_buf(),
                name: "ids".into(),
                file_name: DEFAULT_ID_FILE.into(),
                retention_days: 7,
            },
            channel,
        );
        blob.save(&list).await.unwrap();
        assert_eq!(blob.load().await, list);
    }
}

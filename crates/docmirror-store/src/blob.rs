//! The `blob-artifact` storage method: ids kept in a named, expiring blob.
//!
//! A blob is a small bundle of named files uploaded under a name with a
//! retention period. Saving uploads a fresh blob holding the id file; loading
//! downloads the blob and reads that file back. An expired or missing blob
//! reads as an empty history.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docmirror_core::MessageId;

use crate::config::StorageMethod;
use crate::error::{Result, StoreError};
use crate::traits::{IdFormat, IdentifierStore, SaveOutcome};

const METADATA_FILE: &str = ".blob.json";
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// One file inside a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Blob storage transport.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Download the files of blob `name`; `None` if it does not exist or has
    /// expired.
    async fn download(&self, name: &str) -> Result<Option<Vec<BlobFile>>>;

    /// Upload `files` as blob `name`, replacing any previous blob of that
    /// name. A `retention_days` of 0 never expires.
    async fn upload(&self, name: &str, files: Vec<BlobFile>, retention_days: u32) -> Result<()>;
}

/// [`BlobTransport`] backed by a local directory.
///
/// Each blob is a sub-directory holding its files plus a metadata file with
/// the expiry time.
#[derive(Debug, Clone)]
pub struct DirBlobTransport {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlobMetadata {
    files: Vec<String>,
    created_at: i64,
    expires_at: Option<i64>,
}

impl DirBlobTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_dir(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobTransport for DirBlobTransport {
    async fn download(&self, name: &str) -> Result<Option<Vec<BlobFile>>> {
        let dir = self.blob_dir(name)?;

        let raw = match tokio::fs::read(dir.join(METADATA_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let metadata: BlobMetadata = serde_json::from_slice(&raw)?;

        if let Some(expires_at) = metadata.expires_at {
            if now_millis() >= expires_at {
                tracing::debug!(blob = name, "blob expired");
                return Ok(None);
            }
        }

        let mut files = Vec::with_capacity(metadata.files.len());
        for file_name in metadata.files {
            validate_name(&file_name)?;
            let contents = tokio::fs::read(dir.join(&file_name)).await?;
            files.push(BlobFile {
                name: file_name,
                contents,
            });
        }
        Ok(Some(files))
    }

    async fn upload(&self, name: &str, files: Vec<BlobFile>, retention_days: u32) -> Result<()> {
        let dir = self.blob_dir(name)?;
        for file in &files {
            validate_name(&file.name)?;
        }

        // Replace, never merge with, an earlier blob of the same name.
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&dir).await?;

        for file in &files {
            tokio::fs::write(dir.join(&file.name), &file.contents).await?;
        }

        let created_at = now_millis();
        let metadata = BlobMetadata {
            files: files.into_iter().map(|f| f.name).collect(),
            created_at,
            expires_at: (retention_days > 0)
                .then(|| created_at + i64::from(retention_days) * MILLIS_PER_DAY),
        };
        tokio::fs::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(&metadata)?).await?;
        Ok(())
    }
}

/// Store that keeps the ids in a file inside a blob.
pub struct BlobArtifactStore {
    transport: Arc<dyn BlobTransport>,
    name: String,
    file_name: String,
    retention_days: u32,
}

impl BlobArtifactStore {
    pub fn new(
        transport: Arc<dyn BlobTransport>,
        name: impl Into<String>,
        file_name: impl Into<String>,
        retention_days: u32,
    ) -> Self {
        Self {
            transport,
            name: name.into(),
            file_name: file_name.into(),
            retention_days,
        }
    }
}

#[async_trait]
impl IdentifierStore for BlobArtifactStore {
    fn method(&self) -> StorageMethod {
        StorageMethod::BlobArtifact
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        let files = match self.transport.download(&self.name).await? {
            Some(files) => files,
            None => {
                tracing::info!(blob = %self.name, "no stored blob, starting fresh");
                return Ok(Vec::new());
            }
        };

        let file = files
            .into_iter()
            .find(|f| f.name == self.file_name)
            .ok_or_else(|| {
                StoreError::Blob(format!("blob {} has no file {}", self.name, self.file_name))
            })?;
        let raw = String::from_utf8(file.contents)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        Ok(IdFormat::Lines.decode(&raw))
    }

    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome> {
        let file = BlobFile {
            name: self.file_name.clone(),
            contents: IdFormat::Lines.encode(ids).into_bytes(),
        };
        self.transport
            .upload(&self.name, vec![file], self.retention_days)
            .await?;
        tracing::info!(
            blob = %self.name,
            retention_days = self.retention_days,
            count = ids.len(),
            "uploaded message ids"
        );
        Ok(SaveOutcome::Saved)
    }
}

/// Reject names that would escape the blob directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name == METADATA_FILE
        || name.contains(['/', '\\'])
    {
        return Err(StoreError::Blob(format!("invalid name: {:?}", name)));
    }
    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ids(raw: &[&str]) -> Vec<MessageId> {
        raw.iter().map(|s| MessageId::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(DirBlobTransport::new(dir.path()));
        let store = BlobArtifactStore::new(transport, "message-ids", "messageIDs.txt", 90);

        let list = ids(&["5", "6", "7"]);
        assert_eq!(store.save(&list).await.unwrap(), SaveOutcome::Saved);
        assert_eq!(store.load().await, list);
    }

    #[tokio::test]
    async fn test_missing_blob_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = BlobArtifactStore::new(
            Arc::new(DirBlobTransport::new(dir.path())),
            "never-uploaded",
            "messageIDs.txt",
            1,
        );
        assert_eq!(store.try_load().await.unwrap(), Vec::<MessageId>::new());
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_blob() {
        let dir = TempDir::new().unwrap();
        let transport = DirBlobTransport::new(dir.path());

        let old = BlobFile {
            name: "old.txt".into(),
            contents: b"old".to_vec(),
        };
        let new = BlobFile {
            name: "new.txt".into(),
            contents: b"new".to_vec(),
        };
        transport.upload("ids", vec![old], 0).await.unwrap();
        transport.upload("ids", vec![new.clone()], 0).await.unwrap();

        assert_eq!(transport.download("ids").await.unwrap(), Some(vec![new]));
        assert!(!dir.path().join("ids").join("old.txt").exists());
    }

    #[tokio::test]
    async fn test_expired_blob_reads_absent() {
        let dir = TempDir::new().unwrap();
        let transport = DirBlobTransport::new(dir.path());
        let blob_dir = dir.path().join("ids");
        std::fs::create_dir_all(&blob_dir).unwrap();
        std::fs::write(blob_dir.join("messageIDs.txt"), "1").unwrap();
        let metadata = BlobMetadata {
            files: vec!["messageIDs.txt".into()],
            created_at: 0,
            expires_at: Some(1),
        };
        std::fs::write(
            blob_dir.join(METADATA_FILE),
            serde_json::to_vec(&metadata).unwrap(),
        )
        .unwrap();

        assert_eq!(transport.download("ids").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blob_without_id_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(DirBlobTransport::new(dir.path()));
        transport
            .upload(
                "ids",
                vec![BlobFile {
                    name: "other.txt".into(),
                    contents: b"1".to_vec(),
                }],
                0,
            )
            .await
            .unwrap();

        let store = BlobArtifactStore::new(transport, "ids", "messageIDs.txt", 0);
        assert!(matches!(store.try_load().await, Err(StoreError::Blob(_))));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let transport = DirBlobTransport::new(dir.path());
        assert!(transport.download("../escape").await.is_err());
        assert!(transport.upload("ok", vec![], 0).await.is_ok());
        assert!(transport
            .upload(
                "ok",
                vec![BlobFile {
                    name: "../x".into(),
                    contents: vec![],
                }],
                0
            )
            .await
            .is_err());
    }
}

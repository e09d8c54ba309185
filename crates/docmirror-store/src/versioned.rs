//! The `versioned-file` storage method: an id file kept under version control.
//!
//! The file holds one message id per line. Saving rewrites it, then commits
//! and pushes it through a [`Vcs`] transport so the next run (usually a fresh
//! checkout) finds it.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use docmirror_core::MessageId;

use crate::config::StorageMethod;
use crate::error::{Result, StoreError};
use crate::traits::{IdFormat, IdentifierStore, SaveOutcome};

/// Commit message used for id file updates.
pub const COMMIT_MESSAGE: &str = "Update stored messageIDs";

const DEFAULT_AUTHOR_NAME: &str = "Actions";
const DEFAULT_AUTHOR_EMAIL: &str = "noreply@users.noreply.github.com";

/// Version-control transport: records a file change and publishes it.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Commit the current contents of `path` and push the commit.
    async fn commit_and_push(&self, path: &Path, message: &str) -> Result<()>;
}

/// [`Vcs`] implementation that shells out to `git`.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    remote: Option<String>,
    author_name: String,
    author_email: String,
}

impl GitCli {
    /// Operate on the working copy at `repo_dir`.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: None,
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }

    /// Push `HEAD` to `remote` instead of the branch's upstream.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Commit under `name` instead of the default author.
    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    pub fn with_author_email(mut self, email: impl Into<String>) -> Self {
        self.author_email = email.into();
        self
    }

    /// Run git and return its output whatever the exit status.
    async fn git(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .output()
            .await?;
        Ok(output)
    }

    /// Run git and fail on a non-zero exit.
    async fn run(&self, args: &[&str]) -> Result<()> {
        let output = self.git(args).await?;
        if !output.status.success() {
            return Err(StoreError::Vcs {
                command: format!("git {}", args.join(" ")),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn commit_and_push(&self, path: &Path, message: &str) -> Result<()> {
        let path = path.to_string_lossy();

        self.run(&["add", "--", &path]).await?;

        // Exit status 0 means nothing is staged for this path.
        let staged = self.git(&["diff", "--cached", "--quiet", "--", &path]).await?;
        if staged.status.success() {
            tracing::info!(path = %path, "id file unchanged, nothing to commit");
            return Ok(());
        }

        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        self.run(&["-c", &name, "-c", &email, "commit", "-m", message, "--", &path])
            .await?;

        match &self.remote {
            Some(remote) => self.run(&["push", remote, "HEAD"]).await,
            None => self.run(&["push"]).await,
        }
    }
}

/// Store that keeps the ids in a version-controlled file.
pub struct VersionedFileStore {
    path: PathBuf,
    vcs: Arc<dyn Vcs>,
}

impl VersionedFileStore {
    pub fn new(path: impl Into<PathBuf>, vcs: Arc<dyn Vcs>) -> Self {
        Self {
            path: path.into(),
            vcs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IdentifierStore for VersionedFileStore {
    fn method(&self) -> StorageMethod {
        StorageMethod::VersionedFile
    }

    async fn try_load(&self) -> Result<Vec<MessageId>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(IdFormat::Lines.decode(&raw))
    }

    async fn save(&self, ids: &[MessageId]) -> Result<SaveOutcome> {
        tokio::fs::write(&self.path, IdFormat::Lines.encode(ids)).await?;
        self.vcs.commit_and_push(&self.path, COMMIT_MESSAGE).await?;
        tracing::info!(path = %self.path.display(), count = ids.len(), "committed message ids");
        Ok(SaveOutcome::Saved)
    }
}

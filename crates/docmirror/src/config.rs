//! Command-line and environment configuration.
//!
//! Every option can also be set through the `INPUT_*` variable a CI action
//! runner exports for it, so the binary runs unchanged as an action step.
//! Options are resolved once, before any I/O, into a [`MirrorConfig`], a
//! [`StorageConfig`] and a [`WebhookConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use docmirror_channel::{MessageOptions, WebhookConfig};
use docmirror_core::{ChunkerConfig, MessageId};
use docmirror_store::config::{DEFAULT_ID_FILE, DEFAULT_RETENTION_DAYS};
use docmirror_store::{StorageConfig, StorageMethod};

use crate::error::{MirrorError, Result};
use crate::publish::{PublishConfig, DEFAULT_MAX_CONCURRENCY};

/// Mirror a text document onto a run of chat channel messages.
#[derive(Parser, Debug)]
#[command(name = "docmirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub args: Args,
}

impl Cli {
    /// The command to run; `sync` when none is given.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Sync)
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Publish the document if it changed since the last run
    Sync,
    /// Chunk the document and list the blocks without publishing
    Chunk,
}

#[derive(clap::Args, Debug, Clone)]
pub struct Args {
    /// Webhook URL of the target channel
    #[arg(long, env = "INPUT_WEBHOOK", hide_env_values = true, global = true)]
    pub webhook: Option<String>,

    /// Document to mirror
    #[arg(short, long, env = "INPUT_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Write the new message ids here after a publish
    #[arg(short, long, env = "INPUT_OUTPUTFILELOCATION", global = true)]
    pub output_file: Option<PathBuf>,

    /// Where to keep message ids between runs (none, git, message, artifact)
    #[arg(long, env = "INPUT_STORAGEMETHOD", default_value = "none", global = true)]
    pub storage_method: String,

    /// Id file for the git storage method, relative to the repository
    #[arg(long, env = "INPUT_TRACKEDFILE", default_value = DEFAULT_ID_FILE, global = true)]
    pub tracked_file: PathBuf,

    /// Working copy the id file is committed in
    #[arg(long, env = "INPUT_REPODIR", default_value = ".", global = true)]
    pub repo_dir: PathBuf,

    /// Remote to push the id file to (defaults to the branch's upstream)
    #[arg(long, env = "INPUT_GITREMOTE", global = true)]
    pub git_remote: Option<String>,

    /// Author name of id file commits
    #[arg(long, env = "INPUT_GITAUTHORNAME", global = true)]
    pub git_author_name: Option<String>,

    /// Author email of id file commits
    #[arg(long, env = "INPUT_GITAUTHOREMAIL", global = true)]
    pub git_author_email: Option<String>,

    /// Message holding the ids for the message storage method
    #[arg(long, env = "INPUT_TRACKINGMESSAGEID", global = true)]
    pub tracking_message_id: Option<String>,

    /// Blob name for the artifact storage method
    #[arg(long, env = "INPUT_ARTIFACTNAME", default_value = "message-ids", global = true)]
    pub artifact_name: String,

    /// Directory blobs are kept in for the artifact storage method
    #[arg(long, env = "INPUT_ARTIFACTDIR", default_value = ".docmirror/artifacts", global = true)]
    pub artifact_dir: PathBuf,

    /// Days until a stored blob expires (0 keeps it forever)
    #[arg(long, env = "INPUT_RETENTIONDAYS", default_value_t = DEFAULT_RETENTION_DAYS, global = true)]
    pub retention_days: u32,

    /// Maximum concurrent fetch/delete requests
    #[arg(long, env = "INPUT_MAXCONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY, global = true)]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "INPUT_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "INPUT_LOGLEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (plain, json)
    #[arg(long, env = "INPUT_LOGFORMAT", default_value = "plain", global = true)]
    pub log_format: String,
}

/// Settings of one mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// The document to mirror.
    pub document: PathBuf,
    /// Receives the newline-joined ids after a publish.
    pub output_file: Option<PathBuf>,
    pub chunker: ChunkerConfig,
    pub publish: PublishConfig,
}

impl MirrorConfig {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            output_file: None,
            chunker: ChunkerConfig::default(),
            publish: PublishConfig::default(),
        }
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }
}

impl Args {
    /// Resolve the run settings.
    pub fn mirror_config(&self) -> Result<MirrorConfig> {
        let document = self
            .file
            .clone()
            .ok_or_else(|| MirrorError::Config("a document (--file) is required".into()))?;

        if self.max_concurrency == 0 {
            return Err(MirrorError::Config(
                "--max-concurrency must be at least 1".into(),
            ));
        }

        Ok(MirrorConfig {
            document,
            output_file: self.output_file.clone(),
            chunker: ChunkerConfig::default(),
            publish: PublishConfig {
                max_concurrency: self.max_concurrency,
                message_options: MessageOptions::quiet(),
            },
        })
    }

    /// Resolve the storage method and its options.
    pub fn storage_config(&self) -> Result<StorageConfig> {
        let method: StorageMethod = self.storage_method.parse()?;

        let config = match method {
            StorageMethod::None => StorageConfig::None,
            StorageMethod::VersionedFile => StorageConfig::VersionedFile {
                path: self.tracked_file.clone(),
                repo_dir: self.repo_dir.clone(),
                remote: self.git_remote.clone(),
                author_name: non_empty(self.git_author_name.as_deref()),
                author_email: non_empty(self.git_author_email.as_deref()),
            },
            StorageMethod::TrackingMessage => StorageConfig::TrackingMessage {
                message_id: non_empty(self.tracking_message_id.as_deref()).map(MessageId::from),
            },
            StorageMethod::BlobArtifact => StorageConfig::BlobArtifact {
                root: self.artifact_dir.clone(),
                name: self.artifact_name.clone(),
                file_name: file_name_of(&self.tracked_file),
                retention_days: self.retention_days,
            },
            StorageMethod::Memory => {
                return Err(MirrorError::Config(
                    "the memory storage method keeps nothing between runs".into(),
                ))
            }
        };
        Ok(config)
    }

    /// Resolve the webhook settings.
    pub fn webhook_config(&self) -> Result<WebhookConfig> {
        let url = self
            .webhook
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| MirrorError::Config("a webhook url (--webhook) is required".into()))?;

        let mut config = WebhookConfig::new(url);
        config.timeout = Duration::from_secs(self.timeout_secs.max(1));
        Ok(config)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_ID_FILE.to_string())
}

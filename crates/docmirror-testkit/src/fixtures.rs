//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use docmirror_channel::MemoryChannel;
use docmirror_core::MessageId;
use docmirror_store::{IdentifierStore, MemoryStore};

/// A scratch directory with a document, an in-memory channel and an
/// in-memory identifier store.
pub struct MirrorFixture {
    dir: TempDir,
    pub channel: Arc<MemoryChannel>,
    pub store: Arc<MemoryStore>,
}

impl MirrorFixture {
    /// Create a fixture with an empty channel and store.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
            channel: Arc::new(MemoryChannel::new()),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Create a fixture and write `text` as its document.
    pub fn with_document(text: &str) -> Self {
        let fixture = Self::new();
        fixture.write_document(text);
        fixture
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.path().join("document.md")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("messageIDs.txt")
    }

    /// Replace the document.
    pub fn write_document(&self, text: &str) {
        std::fs::write(self.document_path(), text).expect("write document");
    }

    /// Contents of the output file, if one was written.
    pub fn output(&self) -> Option<String> {
        std::fs::read_to_string(self.output_path()).ok()
    }

    /// Post `texts` as if an earlier run had, and store their ids.
    pub async fn seed(&self, texts: &[&str]) -> Vec<MessageId> {
        let mut ids = Vec::with_capacity(texts.len());
        for text in texts {
            ids.push(self.channel.insert(*text).await);
        }
        self.store.save(&ids).await.expect("seed store");
        ids
    }

    /// Contents of the messages currently on the channel, in posting order.
    pub async fn live_contents(&self) -> Vec<String> {
        self.channel
            .messages()
            .await
            .into_iter()
            .map(|m| m.content)
            .collect()
    }
}

impl Default for MirrorFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A document of `count` paragraphs of `chars_each` characters.
///
/// Paragraph `i` is made of the letter `a + i % 26`, so paragraphs are
/// easy to tell apart in assertions.
pub fn paragraphs(count: usize, chars_each: usize) -> String {
    (0..count)
        .map(|i| {
            let letter = char::from(b'a' + (i % 26) as u8);
            std::iter::repeat(letter).take(chars_each).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A small README-like document that fits one message.
pub const SAMPLE_DOCUMENT: &str = "# Server rules

Be kind to each other.

## Channels
Keep topics in their channels.
Off-topic goes to #random.

## Contact
Ask a moderator.";

//! Document chunking.
//!
//! A document is cut into segments at blank lines and in front of headings,
//! then the segments are merged greedily into blocks that each fit one
//! channel message.
//!
//! Algorithm:
//! 1. Split at any run of two or more newlines, or at a single newline
//!    followed by a heading marker (`# `, `## ` or `### `)
//! 2. Trim every segment (empty segments are kept so ordinals stay stable)
//! 3. Append each segment to the current block while it fits, joined by a
//!    blank line, or by a single newline when the segment is a heading
//! 4. Otherwise close the block and start a new one with the segment

use crate::error::{ChunkError, Result};
use crate::types::{Block, MAX_MESSAGE_LENGTH};

/// Number of characters shown from each end of an oversized segment.
const PREVIEW_CHARS: usize = 40;

/// Configuration for the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Maximum block length in characters.
    pub max_len: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_len: MAX_MESSAGE_LENGTH,
        }
    }
}

/// Splits documents into message-sized blocks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk `text` into ordered blocks.
    ///
    /// Always returns at least one block: the empty document becomes a
    /// single empty block.
    pub fn chunk(&self, text: &str) -> Result<Vec<Block>> {
        let max_len = self.config.max_len;
        let mut closed: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for (index, raw) in split_segments(text).into_iter().enumerate() {
            let segment = raw.trim();
            let segment_len = segment.chars().count();

            if segment_len > max_len {
                return Err(too_large(index, segment, segment_len, max_len));
            }

            let separator = if current.is_empty() {
                ""
            } else if is_heading(segment) {
                "\n"
            } else {
                "\n\n"
            };

            if current_len + separator.len() + segment_len <= max_len {
                current.push_str(separator);
                current.push_str(segment);
                current_len += separator.len() + segment_len;
            } else {
                closed.push(std::mem::take(&mut current));
                current.push_str(segment);
                current_len = segment_len;
            }
        }
        closed.push(current);

        Ok(closed
            .into_iter()
            .enumerate()
            .map(|(index, text)| Block::new(index, text))
            .collect())
    }
}

/// Chunk `text` with the default message limit.
pub fn chunk(text: &str) -> Result<Vec<Block>> {
    Chunker::default().chunk(text)
}

/// Split `text` into raw, untrimmed segments.
///
/// Boundaries are runs of two or more newlines, and single newlines that
/// precede a heading. The newlines themselves are dropped.
pub fn split_segments(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\n' {
            i += 1;
            continue;
        }

        let run_start = i;
        while i < bytes.len() && bytes[i] == b'\n' {
            i += 1;
        }

        // `i` sits right after an ASCII newline, so slicing here is safe.
        if i - run_start >= 2 || is_heading(&text[i..]) {
            segments.push(&text[start..run_start]);
            start = i;
        }
    }

    segments.push(&text[start..]);
    segments
}

/// Whether `s` starts with a heading marker: one to three `#` then a space.
pub fn is_heading(s: &str) -> bool {
    let hashes = s.bytes().take_while(|&b| b == b'#').count();
    (1..=3).contains(&hashes) && s.as_bytes().get(hashes) == Some(&b' ')
}

fn too_large(index: usize, segment: &str, length: usize, limit: usize) -> ChunkError {
    ChunkError::BlockTooLarge {
        index,
        length,
        limit,
        starts_with: segment.chars().take(PREVIEW_CHARS).collect(),
        ends_with: segment
            .chars()
            .skip(length.saturating_sub(PREVIEW_CHARS))
            .collect(),
    }
}

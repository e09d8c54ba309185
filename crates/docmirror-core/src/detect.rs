//! Change detection between posted messages and freshly chunked blocks.
//!
//! The comparison is all-or-nothing: either every block matches the message
//! at the same position, or the whole sequence is republished.
//!
//! Equality is exact. The channel may normalize some characters on its side,
//! in which case an unchanged document is still reported as changed and gets
//! republished.

use crate::types::{Block, Message};

/// Why the posted messages no longer match the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// The number of blocks differs from the number of posted messages.
    CountMismatch { existing: usize, blocks: usize },
    /// The block at `index` differs from the message at the same position.
    ContentDiffers { index: usize },
}

/// Find the first reason to republish, if any.
pub fn detect_change(existing: &[Message], blocks: &[Block]) -> Option<ChangeReason> {
    if existing.len() != blocks.len() {
        return Some(ChangeReason::CountMismatch {
            existing: existing.len(),
            blocks: blocks.len(),
        });
    }

    existing
        .iter()
        .zip(blocks)
        .position(|(message, block)| message.content != block.text)
        .map(|index| ChangeReason::ContentDiffers { index })
}

/// Whether the block sequence must be republished.
pub fn should_republish(existing: &[Message], blocks: &[Block]) -> bool {
    detect_change(existing, blocks).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(contents: &[&str]) -> Vec<Message> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Message::new(format!("{}", 100 + i), *c))
            .collect()
    }

    fn blocks(texts: &[&str]) -> Vec<Block> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Block::new(i, *t))
            .collect()
    }

    #[test]
    fn test_identical_sequences_unchanged() {
        let existing = messages(&["one", "two"]);
        let fresh = blocks(&["one", "two"]);
        assert_eq!(detect_change(&existing, &fresh), None);
        assert!(!should_republish(&existing, &fresh));
    }

    #[test]
    fn test_count_mismatch_forces_republish() {
        // First two blocks are byte-identical; the extra block alone decides.
        let existing = messages(&["one", "two"]);
        let fresh = blocks(&["one", "two", "three"]);
        assert_eq!(
            detect_change(&existing, &fresh),
            Some(ChangeReason::CountMismatch {
                existing: 2,
                blocks: 3
            })
        );
        assert!(should_republish(&existing, &fresh));
    }

    #[test]
    fn test_first_differing_block_reported() {
        let existing = messages(&["one", "two", "three"]);
        let fresh = blocks(&["one", "2", "3"]);
        assert_eq!(
            detect_change(&existing, &fresh),
            Some(ChangeReason::ContentDiffers { index: 1 })
        );
    }

    #[test]
    fn test_nothing_posted_and_one_block() {
        assert!(should_republish(&[], &blocks(&[""])));
    }

    #[test]
    fn test_normalized_content_counts_as_change() {
        // Zero-width space stripped by the channel still reads as a change.
        let existing = messages(&["hello"]);
        let fresh = blocks(&["hel\u{200b}lo"]);
        assert!(should_republish(&existing, &fresh));
    }
}

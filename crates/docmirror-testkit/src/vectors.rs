//! Golden chunking vectors.
//!
//! Each vector pins the exact block texts the chunker must produce for an
//! input under the default message limit.

use docmirror_core::{chunk, MAX_MESSAGE_LENGTH};

/// A golden chunking vector.
#[derive(Debug, Clone)]
pub struct ChunkVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document text.
    pub input: String,
    /// Expected block texts, in order.
    pub expected: Vec<String>,
}

impl ChunkVector {
    fn new(name: &'static str, input: impl Into<String>, expected: &[&str]) -> Self {
        Self {
            name,
            input: input.into(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Get all golden chunking vectors.
pub fn all_vectors() -> Vec<ChunkVector> {
    let half = MAX_MESSAGE_LENGTH / 2;
    let a_fit = "a".repeat(half - 1);
    let b_fit = "b".repeat(half - 1);
    let exact = format!("{}\n\n{}", a_fit, b_fit);
    let a_big = "a".repeat(1500);
    let b_big = "b".repeat(600);
    let wide = format!("{}\n\n{}", "é".repeat(half - 1), "ü".repeat(half - 1));

    vec![
        ChunkVector::new("empty document", "", &[""]),
        ChunkVector::new("single paragraph", "hello world", &["hello world"]),
        ChunkVector::new(
            "paragraphs merge with a blank line",
            "one\n\ntwo\n\n\nthree",
            &["one\n\ntwo\n\nthree"],
        ),
        ChunkVector::new(
            "single newline inside a paragraph is kept",
            "line one\nline two",
            &["line one\nline two"],
        ),
        ChunkVector::new(
            "heading after a single newline",
            "intro\n# Title\nbody",
            &["intro\n# Title\nbody"],
        ),
        ChunkVector::new(
            "heading after a blank line joins with one newline",
            "intro\n\n## Part\ntext",
            &["intro\n## Part\ntext"],
        ),
        ChunkVector::new(
            "fourth-level heading is not a boundary",
            "intro\n#### Deep\ntext",
            &["intro\n#### Deep\ntext"],
        ),
        ChunkVector::new("hashtag is not a heading", "a\n\n#tag", &["a\n\n#tag"]),
        ChunkVector::new(
            "surrounding whitespace is trimmed",
            "  padded  \n\n  next ",
            &["padded\n\nnext"],
        ),
        ChunkVector::new(
            "exact fit including separator",
            exact.clone(),
            &[exact.as_str()],
        ),
        ChunkVector::new(
            "overflow starts a new block",
            format!("{}\n\n{}", a_big, b_big),
            &[a_big.as_str(), b_big.as_str()],
        ),
        ChunkVector::new(
            "multibyte text counts characters",
            wide.clone(),
            &[wide.as_str()],
        ),
    ]
}

/// Chunk every vector and report mismatches as `(name, reason)`.
pub fn verify_all_vectors() -> Vec<(String, String)> {
    all_vectors()
        .into_iter()
        .filter_map(|v| {
            let got = match chunk(&v.input) {
                Ok(blocks) => blocks.into_iter().map(|b| b.text).collect::<Vec<_>>(),
                Err(e) => return Some((v.name.to_string(), e.to_string())),
            };
            (got != v.expected).then(|| {
                (
                    v.name.to_string(),
                    format!("expected {:?}, got {:?}", v.expected, got),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        let failures = verify_all_vectors();
        assert!(failures.is_empty(), "{:#?}", failures);
    }

    #[test]
    fn test_vector_blocks_fit() {
        for vector in all_vectors() {
            for block in &vector.expected {
                assert!(
                    block.chars().count() <= MAX_MESSAGE_LENGTH,
                    "vector '{}' expects an oversized block",
                    vector.name
                );
            }
        }
    }
}

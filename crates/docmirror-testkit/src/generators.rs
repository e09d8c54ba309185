//! Proptest generators for documents.

use proptest::prelude::*;

/// One top-level part of a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocPart {
    /// `#`, `##` or `###` heading line.
    Heading { level: usize, title: String },
    /// Paragraph of one or more lines.
    Paragraph(String),
}

impl DocPart {
    /// The part's text as it appears in a block.
    pub fn text(&self) -> String {
        match self {
            DocPart::Heading { level, title } => format!("{} {}", "#".repeat(*level), title),
            DocPart::Paragraph(text) => text.clone(),
        }
    }
}

/// Generate a heading title.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,15}( [a-z]{1,10}){0,3}".prop_map(String::from)
}

/// Generate a heading.
pub fn heading() -> impl Strategy<Value = DocPart> {
    (1usize..=3, title()).prop_map(|(level, title)| DocPart::Heading { level, title })
}

/// Generate a single line of prose with no leading or trailing space.
pub fn line(max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,10}[,.]?", 1..=max_words.max(1)).prop_map(|w| w.join(" "))
}

/// Generate a paragraph of up to `max_lines` lines.
pub fn paragraph(max_lines: usize) -> impl Strategy<Value = DocPart> {
    prop::collection::vec(line(30), 1..=max_lines.max(1))
        .prop_map(|lines| DocPart::Paragraph(lines.join("\n")))
}

/// Generate a paragraph close to the message limit, without spaces.
pub fn long_paragraph(min_chars: usize, max_chars: usize) -> impl Strategy<Value = DocPart> {
    (min_chars..=max_chars).prop_map(|n| DocPart::Paragraph("x".repeat(n)))
}

/// Generate the parts of a document that always fits the message limit.
pub fn document_parts() -> impl Strategy<Value = Vec<DocPart>> {
    prop::collection::vec(
        prop_oneof![
            2 => heading(),
            5 => paragraph(4),
            1 => long_paragraph(1200, 2000),
        ],
        1..30,
    )
}

/// Render parts as a document: a heading follows a single newline,
/// everything else a blank line.
pub fn render(parts: &[DocPart]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(match part {
                DocPart::Heading { .. } => "\n",
                DocPart::Paragraph(_) => "\n\n",
            });
        }
        out.push_str(&part.text());
    }
    out
}

/// Generate a rendered document that always fits the message limit.
pub fn document() -> impl Strategy<Value = String> {
    document_parts().prop_map(|parts| render(&parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_core::{chunk, MAX_MESSAGE_LENGTH};

    proptest! {
        #[test]
        fn generated_documents_chunk(parts in document_parts()) {
            let blocks = chunk(&render(&parts)).unwrap();
            prop_assert!(blocks.iter().all(|b| b.len() <= MAX_MESSAGE_LENGTH));
        }

        #[test]
        fn blocks_reassemble_parts_in_order(parts in document_parts()) {
            let blocks = chunk(&render(&parts)).unwrap();

            // Headings rejoin with one newline, paragraphs with a blank line,
            // so splitting the blocks back up recovers every part's text.
            let joined: Vec<String> = blocks.iter().map(|b| b.text.clone()).collect();
            let expected: Vec<String> = parts.iter().map(DocPart::text).collect();
            let rejoined = joined.join("\n\n");
            let mut cursor = 0;
            for text in &expected {
                let found = rejoined[cursor..].find(text.as_str());
                prop_assert!(found.is_some(), "part {:?} missing or out of order", text);
                cursor += found.unwrap_or_default() + text.len();
            }
        }
    }
}

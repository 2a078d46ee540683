//! Source citations built from grounding chunks

use std::collections::HashSet;

use crate::types::{Chunk, SourceCitation};

/// Maximum snippet length in characters
pub const SNIPPET_CHARS: usize = 300;

/// One citation per distinct `(source, page)`, in order of first appearance.
/// The first chunk seen for a key supplies its path and snippet.
pub fn dedup_sources(chunks: &[Chunk]) -> Vec<SourceCitation> {
    let mut seen: HashSet<(&str, Option<u32>)> = HashSet::new();
    let mut citations = Vec::new();

    for chunk in chunks {
        let key = (chunk.metadata.source.as_str(), chunk.metadata.page);
        if !seen.insert(key) {
            continue;
        }
        citations.push(SourceCitation {
            source: chunk.metadata.source.clone(),
            path: chunk.metadata.path.clone(),
            page: chunk.metadata.page,
            snippet: snippet(&chunk.text),
        });
    }

    citations
}

fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn chunk(text: &str, source: &str, path: &str, page: Option<u32>) -> Chunk {
        Chunk::new(
            text,
            DocumentMetadata {
                source: source.into(),
                path: path.into(),
                page,
            },
        )
    }

    #[test]
    fn test_dedup_by_source_and_page() {
        let citations = dedup_sources(&[
            chunk("first p0", "manual.pdf", "a/manual.pdf", Some(0)),
            chunk("faq", "faq.txt", "a/faq.txt", None),
            chunk("second p0", "manual.pdf", "b/manual.pdf", Some(0)),
            chunk("p1", "manual.pdf", "a/manual.pdf", Some(1)),
            chunk("faq again", "faq.txt", "a/faq.txt", None),
        ]);

        assert_eq!(citations.len(), 3);
        assert_eq!(citations[0].snippet, "first p0");
        assert_eq!(citations[0].path, "a/manual.pdf");
        assert_eq!(citations[1].source, "faq.txt");
        assert_eq!(citations[2].page, Some(1));
    }

    #[test]
    fn test_snippet_truncates_on_chars() {
        let long = "é".repeat(400);
        let citations = dedup_sources(&[chunk(&long, "x.txt", "x.txt", None)]);
        assert_eq!(citations[0].snippet.chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn test_no_chunks_no_citations() {
        assert!(dedup_sources(&[]).is_empty());
    }
}

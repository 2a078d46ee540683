//! Recursive character chunking with overlap
//!
//! Text is split on the coarsest separator present (paragraph, line, word,
//! character), pieces that are still too long are split again with the finer
//! separators, and neighbouring pieces are merged back into chunks of at most
//! `chunk_size` characters. Consecutive chunks share up to `chunk_overlap`
//! characters of trailing context. All lengths count Unicode scalar values.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, Document};

/// Separators tried in order, coarsest first; the empty string means "per character"
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character text splitter
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Overlap carried between chunks
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a new splitter with the default separators
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split every document, each chunk inheriting its parent's metadata
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .map(move |text| Chunk::new(text, doc.metadata.clone()))
            })
            .collect()
    }

    /// Split raw text into trimmed, non-empty chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut finer: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, keeping a tail of up to
    /// `chunk_overlap` characters as the start of the next chunk
    fn merge_splits(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }
                if let Some(chunk) = join_window(&window) {
                    merged.push(chunk);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }

        if let Some(chunk) = join_window(&window) {
            merged.push(chunk);
        }
        merged
    }
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_window(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split on `separator`, keeping each separator at the start of the piece
/// that follows it. An empty separator splits into single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;
    use std::path::PathBuf;

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keeping_separator("héllo", ""), vec!["h", "é", "l", "l", "o"]);
    }

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = RecursiveCharacterSplitter::default();
        let chunks = splitter.split_text("  Refunds are accepted within 30 days.  ");
        assert_eq!(chunks, vec!["Refunds are accepted within 30 days."]);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        let splitter = RecursiveCharacterSplitter::default();
        assert!(splitter.split_text(" \n\n \t ").is_empty());
        assert!(splitter.split_text("").is_empty());
    }

    #[test]
    fn test_hard_cut_overlap_is_exact() {
        let splitter = RecursiveCharacterSplitter::new(1000, 150);
        let text: String = (0..2500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = splitter.split_text(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], &text[0..1000]);
        assert_eq!(chunks[1], &text[850..1850]);
        assert_eq!(chunks[2], &text[1700..2500]);
    }

    #[test]
    fn test_paragraphs_merge_under_limit() {
        let splitter = RecursiveCharacterSplitter::new(50, 10);
        let text = "First paragraph here.\n\nSecond one.\n\nThird paragraph is a bit longer.";
        let chunks = splitter.split_text(text);

        assert_eq!(chunks[0], "First paragraph here.\n\nSecond one.");
        assert_eq!(chunks[1], "Third paragraph is a bit longer.");
    }

    #[test]
    fn test_chunks_respect_size_and_come_from_text() {
        let splitter = RecursiveCharacterSplitter::new(100, 20);
        let sentence = "Our support team answers billing questions within one business day. ";
        let text = format!("{}\n\n{}\n{}", sentence.repeat(5), sentence.repeat(3), sentence);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
            assert!(text.contains(chunk.as_str()));
        }
    }

    #[test]
    fn test_multibyte_lengths_count_chars() {
        let splitter = RecursiveCharacterSplitter::new(10, 2);
        let text = "ééééééééééééééééééééé";
        for chunk in splitter.split_text(text) {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn test_split_documents_inherits_metadata() {
        let splitter = RecursiveCharacterSplitter::new(20, 5);
        let meta = DocumentMetadata::for_file(&PathBuf::from("docs/manual.pdf")).with_page(4);
        let doc = Document::new("one two three four five six seven eight nine ten", meta.clone());
        let chunks = splitter.split_documents(&[doc]);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.metadata == meta));
    }
}

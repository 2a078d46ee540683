//! Documents, chunks and indexed records with provenance for citations

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// File formats the ingestion pipeline knows how to load
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document, loaded page by page
    Pdf,
    /// Plain UTF-8 text
    Txt,
    /// Microsoft Word document (.docx)
    Docx,
    /// Markdown file
    Markdown,
    /// CSV file, one document per row
    Csv,
}

impl FileType {
    /// Detect file type from a lower- or upper-case extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            "md" => Some(Self::Markdown),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Docx => "docx",
            Self::Markdown => "md",
            Self::Csv => "csv",
        }
    }
}

/// Provenance attached to every document, chunk and indexed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File name, e.g. `refund_policy.pdf`
    pub source: String,
    /// Full path of the file at ingestion time
    pub path: String,
    /// 0-based page index, present only for paged formats
    pub page: Option<u32>,
}

impl DocumentMetadata {
    /// Metadata for a file on disk, without a page
    pub fn for_file(path: &Path) -> Self {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            source,
            path: path.to_string_lossy().into_owned(),
            page: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Human-facing 1-based page number
    pub fn display_page(&self) -> Option<u32> {
        self.page.map(|p| p + 1)
    }
}

/// A unit of loaded content, one file or one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A contiguous piece of a document's text, sized for embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A chunk stored in the vector index together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub id: Uuid,
    pub text: String,
    pub metadata: DocumentMetadata,
    pub embedding: Vec<f32>,
}

impl IndexedRecord {
    /// Build a record from a chunk and its embedding, assigning a fresh id
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: chunk.text,
            metadata: chunk.metadata,
            embedding,
        }
    }

    pub fn to_chunk(&self) -> Chunk {
        Chunk::new(self.text.clone(), self.metadata.clone())
    }
}

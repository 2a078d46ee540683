//! Response types for chat and ingestion

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// Answer shown when a chat request fails
pub const FALLBACK_ANSWER: &str = "An error occurred.";

/// Citation for one (source, page) pair used in the grounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Source file name
    pub source: String,
    /// Full path of the source file
    pub path: String,
    /// 0-based page index, `null` for unpaged formats
    pub page: Option<u32>,
    /// First 300 characters of the first chunk cited for this key
    pub snippet: String,
}

/// Generated answer with its citations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceCitation>,
}

/// Result of one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The index was replaced with freshly embedded chunks
    Indexed {
        files: usize,
        documents: usize,
        chunks: usize,
    },
    /// Nothing loadable was found; the index was left untouched
    NoDocuments,
}

/// Boundary response for `chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            sources: answer.sources,
            error: None,
            error_kind: None,
        }
    }
}

impl From<&Error> for ChatResponse {
    fn from(err: &Error) -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}

impl ChatResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Status string of an ingestion response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Success,
    NoDocuments,
    Error,
}

/// Boundary response for `ingest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: IngestStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl From<IngestOutcome> for IngestResponse {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Indexed {
                files,
                documents,
                chunks,
            } => Self {
                status: IngestStatus::Success,
                message: format!(
                    "Ingested {} chunks from {} documents ({} files).",
                    chunks, documents, files
                ),
                files: Some(files),
                documents: Some(documents),
                chunks: Some(chunks),
                error_kind: None,
            },
            IngestOutcome::NoDocuments => Self {
                status: IngestStatus::NoDocuments,
                message: "No documents found to ingest.".to_string(),
                files: None,
                documents: None,
                chunks: None,
                error_kind: None,
            },
        }
    }
}

impl From<&Error> for IngestResponse {
    fn from(err: &Error) -> Self {
        Self {
            status: IngestStatus::Error,
            message: err.to_string(),
            files: None,
            documents: None,
            chunks: None,
            error_kind: Some(err.kind()),
        }
    }
}

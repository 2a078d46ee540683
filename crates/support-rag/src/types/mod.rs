//! Core types for the support RAG service

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, DocumentMetadata, FileType, IndexedRecord};
pub use query::{ChatRequest, QueryResult};
pub use response::{
    Answer, ChatResponse, IngestOutcome, IngestResponse, IngestStatus, SourceCitation,
    FALLBACK_ANSWER,
};

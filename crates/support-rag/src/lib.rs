//! support-rag: customer support assistant over a folder of documents
//!
//! Documents (PDF, TXT, DOCX, Markdown, CSV) are loaded from a data folder,
//! split into overlapping chunks, embedded and persisted in a SQLite vector
//! index. Questions are answered by retrieving the nearest chunks, filtering
//! them by distance and asking an LLM for an answer grounded only in that
//! context, with de-duplicated source citations.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, ErrorKind, Result};
pub use service::RagService;
pub use types::{
    Answer, ChatRequest, ChatResponse, Chunk, Document, DocumentMetadata, FileType,
    IngestOutcome, IngestResponse, IngestStatus, SourceCitation,
};

//! Error types for the support RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers when a query hits an empty index
pub const EMPTY_INDEX_MESSAGE: &str = "Vector index is empty. Please run ingestion first (/ingest).";

/// RAG service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data folder missing or not a directory
    #[error("Data folder not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Query attempted before anything was indexed
    #[error("{}", EMPTY_INDEX_MESSAGE)]
    EmptyIndex,

    /// A loader could not read or parse a file
    #[error("Failed to load '{}': {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Language model error
    #[error("Generation failed: {0}")]
    Generation(String),

    /// An operation exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Vector index storage error
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Bad input from a caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error category carried in boundary responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    NotFound,
    EmptyIndex,
    Load,
    Embedding,
    Generation,
    Timeout,
    VectorIndex,
    InvalidRequest,
    Io,
    Json,
    Http,
    Internal,
}

impl ErrorKind {
    /// Snake-case name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::NotFound => "not_found",
            ErrorKind::EmptyIndex => "empty_index",
            ErrorKind::Load => "load",
            ErrorKind::Embedding => "embedding",
            ErrorKind::Generation => "generation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::VectorIndex => "vector_index",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
            ErrorKind::Http => "http",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Error {
    /// Create a load error for a file
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a vector index error
    pub fn vector_index(message: impl Into<String>) -> Self {
        Self::VectorIndex(message.into())
    }

    /// Create a timeout error naming the operation
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout(operation.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::EmptyIndex => ErrorKind::EmptyIndex,
            Error::Load { .. } => ErrorKind::Load,
            Error::Embedding(_) => ErrorKind::Embedding,
            Error::Generation(_) => ErrorKind::Generation,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::VectorIndex(_) => ErrorKind::VectorIndex,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
            Error::Http(_) => ErrorKind::Http,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a provider call that failed this way is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err
                        .status()
                        .map(|s| s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error())
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyIndex => StatusCode::SERVICE_UNAVAILABLE,
            Error::Load { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Embedding(_) | Error::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::VectorIndex(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

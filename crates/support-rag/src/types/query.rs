//! Query request and retrieval result types

use serde::{Deserialize, Serialize};

use super::document::Chunk;
use crate::error::{Error, Result};

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer
    pub question: String,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    /// Trimmed question, rejecting blank input
    pub fn validated_question(&self) -> Result<&str> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(Error::invalid_request("question must not be empty"));
        }
        Ok(question)
    }
}

/// One retrieval candidate; lower distance means closer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub chunk: Chunk,
    pub distance: f32,
}

impl QueryResult {
    pub fn new(chunk: Chunk, distance: f32) -> Self {
        Self { chunk, distance }
    }
}

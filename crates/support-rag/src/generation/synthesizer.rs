//! Answer synthesis: context formatting, generation and citation policy

use std::sync::Arc;

use super::citation::dedup_sources;
use super::prompt::{build_rag_prompt, format_context, is_not_found_answer};
use crate::error::Result;
use crate::providers::Generator;
use crate::types::{Answer, Chunk};

/// Turns a question and its grounding chunks into a cited answer
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Generate an answer. Citations come only from `chunks` and are dropped
    /// entirely when the model reports that the answer is not in the context.
    pub async fn synthesize(&self, question: &str, chunks: &[Chunk]) -> Result<Answer> {
        let context = format_context(chunks);
        let prompt = build_rag_prompt(question, &context);

        let text = self.generator.complete(&prompt).await?;

        let sources = if is_not_found_answer(&text) {
            tracing::info!("Answer not found in context, suppressing citations");
            Vec::new()
        } else {
            dedup_sources(chunks)
        };

        Ok(Answer { text, sources })
    }
}

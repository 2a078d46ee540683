//! Answer generation with grounding prompt and citation handling

pub mod citation;
pub mod prompt;
mod synthesizer;

pub use citation::dedup_sources;
pub use prompt::{build_rag_prompt, format_context, is_not_found_answer, NOT_FOUND_ANSWER};
pub use synthesizer::AnswerSynthesizer;

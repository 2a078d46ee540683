//! Grounding context and prompt construction

use crate::types::Chunk;

/// Exact phrase the model is told to use when the context lacks the answer
pub const NOT_FOUND_ANSWER: &str = "I don't have that information in the provided documents.";

/// Render retrieved chunks as numbered source blocks separated by blank lines
///
/// ```text
/// [1] Source: refund_policy.pdf (page 2)
/// Refunds are accepted within 30 days...
/// ```
pub fn format_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut header = format!("[{}] Source: {}", i + 1, chunk.metadata.source);
            if let Some(page) = chunk.metadata.display_page() {
                header.push_str(&format!(" (page {})", page));
            }
            format!("{}\n{}", header, chunk.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full strict-grounding prompt
pub fn build_rag_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are a helpful customer support assistant.
Answer the user's question strictly using the provided context.
If the answer is not present in the context, say exactly:
"{NOT_FOUND_ANSWER}"

<context>
{context}
</context>

Question: {question}"#
    )
}

/// Whether an answer contains the not-found phrase (case-insensitive)
pub fn is_not_found_answer(answer: &str) -> bool {
    let needle = NOT_FOUND_ANSWER.trim_end_matches('.').to_lowercase();
    answer
        .replace('\u{2019}', "'")
        .to_lowercase()
        .contains(&needle)
}

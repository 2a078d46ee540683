//! Generator trait for prompt completion

use async_trait::async_trait;
use crate::error::Result;

/// Trait for language-model text generation
///
/// Implementations run with temperature 0 so the same prompt yields the same
/// answer as far as the backend allows.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a fully built prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}

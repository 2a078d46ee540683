//! Groq chat-completions generator (OpenAI-compatible API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::http::{build_client, check_status, send_error, RetryPolicy};
use super::llm::Generator;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Generator backed by Groq's hosted models
pub struct GroqGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl GroqGenerator {
    /// Create a generator from config; the API key must be set
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .groq_api_key
            .clone()
            .ok_or_else(|| Error::Config("GROQ_API_KEY is not set".into()))?;

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.groq_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.groq_model.clone(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Generator for GroqGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.completions_url();

        tracing::info!("Generating answer with Groq model: {}", self.model);

        self.retry
            .run("Groq generation", || async {
                let request = ChatCompletionRequest {
                    model: &self.model,
                    messages: [ChatMessage {
                        role: "user",
                        content: prompt,
                    }],
                    temperature: 0.0,
                };
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| send_error("Groq generation", e))?;
                let response = check_status("Groq generation", response).await?;

                let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
                    Error::generation(format!("Failed to parse Groq response: {}", e))
                })?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| Error::generation("Groq returned no choices"))
            })
            .await
            .map_err(|e| match e {
                Error::Http(err) => Error::generation(format!("Groq request failed: {}", err)),
                other => other,
            })
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = LlmConfig::default();
        assert!(matches!(GroqGenerator::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatCompletionRequest {
            model: "llama-3.3-70b-versatile",
            messages: [ChatMessage {
                role: "user",
                content: "prompt",
            }],
            temperature: 0.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["temperature"], 0.0);
    }

    #[test]
    fn test_completions_url() {
        let config = LlmConfig {
            groq_api_key: Some("key".into()),
            groq_base_url: "https://api.groq.com/openai/v1/".into(),
            ..LlmConfig::default()
        };
        let generator = GroqGenerator::new(&config).unwrap();
        assert_eq!(
            generator.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(generator.model(), "llama-3.3-70b-versatile");
    }
}

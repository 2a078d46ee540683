//! Ollama-based providers for embeddings and generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::Embedder;
use super::http::{build_client, check_status, send_error, RetryPolicy};
use super::llm::Generator;

/// Ollama API client with automatic retry
pub struct OllamaClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let embedding = self
            .retry
            .run("Ollama embedding", || async {
                let request = EmbedRequest { model, prompt: text };
                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| send_error("Ollama embedding", e))?;
                let response = check_status("Ollama embedding", response).await?;

                let parsed: EmbedResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;
                Ok(parsed.embedding)
            })
            .await
            .map_err(|e| match e {
                Error::Http(err) => Error::embedding(format!("Embedding request failed: {}", err)),
                other => other,
            })?;

        if embedding.is_empty() {
            return Err(Error::embedding(format!(
                "model '{}' returned an empty embedding",
                model
            )));
        }
        Ok(embedding)
    }

    /// Generate a completion with temperature 0
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        tracing::info!("Generating answer with model: {}", model);

        self.retry
            .run("Ollama generation", || async {
                let request = GenerateRequest {
                    model,
                    prompt,
                    stream: false,
                    options: GenerateOptions { temperature: 0.0 },
                };
                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| send_error("Ollama generation", e))?;
                let response = check_status("Ollama generation", response).await?;

                let parsed: GenerateResponse = response.json().await.map_err(|e| {
                    Error::generation(format!("Failed to parse generation response: {}", e))
                })?;
                Ok(parsed.response)
            })
            .await
            .map_err(|e| match e {
                Error::Http(err) => Error::generation(format!("Generation request failed: {}", err)),
                other => other,
            })
    }
}

/// Ollama embedding provider (all-MiniLM-L6-v2 by default)
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        Ok(Self::from_client(
            Arc::new(OllamaClient::new(llm)?),
            embeddings.model.clone(),
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(&self.model, text).await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama generation provider
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaGenerator {
    /// Create a new Ollama generator
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self::from_client(
            Arc::new(OllamaClient::new(config)?),
            config.generate_model.clone(),
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.model, prompt).await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

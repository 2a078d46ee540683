//! Configuration for the support RAG service
//!
//! Values come from a TOML file (explicit path, `./support-rag.toml`, or the
//! user config directory), then environment overrides, then validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "support-rag.toml";

/// Name of the SQLite file inside the persistence directory
pub const INDEX_FILE_NAME: &str = "index.sqlite3";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Data and persistence locations
    pub paths: PathsConfig,
    /// Language model configuration
    pub llm: LlmConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Text chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval tuning
    pub retrieval: RetrievalConfig,
    /// HNSW graph parameters
    pub vector_db: VectorDbConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Upper bound for answering one question, in seconds
    pub query_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            query_timeout_secs: 180,
        }
    }
}

/// Where documents are read from and where the index lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder scanned by ingestion
    pub data_dir: PathBuf,
    /// Folder holding the vector index
    pub persist_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/sampledocs"),
            persist_dir: PathBuf::from("vectordb"),
        }
    }
}

impl PathsConfig {
    /// Full path of the SQLite index file
    pub fn index_path(&self) -> PathBuf {
        self.persist_dir.join(INDEX_FILE_NAME)
    }
}

/// Which service generates answers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Groq hosted API (OpenAI-compatible)
    Groq,
}

impl std::str::FromStr for LlmProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "groq" => Ok(LlmProvider::Groq),
            other => Err(Error::Config(format!("unknown LLM provider '{}'", other))),
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Generation backend
    pub provider: LlmProvider,
    /// Ollama base URL (also used for embeddings)
    pub base_url: String,
    /// Ollama generation model
    pub generate_model: String,
    /// Groq API base URL
    pub groq_base_url: String,
    /// Groq model name
    pub groq_model: String,
    /// Groq API key, usually supplied through `GROQ_API_KEY`
    #[serde(skip_serializing)]
    pub groq_api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2".to_string(),
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
            groq_api_key: None,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

impl LlmConfig {
    /// Model name used by the active provider
    pub fn active_model(&self) -> &str {
        match self.provider {
            LlmProvider::Ollama => &self.generate_model,
            LlmProvider::Groq => &self.groq_model,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama embedding model (all-MiniLM-L6-v2)
    pub model: String,
    /// Texts embedded per batch during ingestion
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            batch_size: 32,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// Retrieval tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates fetched from the index
    pub top_k: usize,
    /// Maximum distance for a candidate to count as relevant
    pub distance_threshold: f32,
    /// Candidates kept when nothing passes the threshold
    pub fallback_count: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            distance_threshold: 0.8,
            fallback_count: 2,
        }
    }
}

/// HNSW graph parameters for the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Links per node
    pub hnsw_m: usize,
    /// Candidate list size while building
    pub hnsw_ef_construction: usize,
    /// Candidate list size while searching
    pub hnsw_ef_search: usize,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            hnsw_m: 16,
            hnsw_ef_construction: 200,
            hnsw_ef_search: 64,
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Resolve, read, override from the environment and validate
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_location() {
                Some(path) => {
                    tracing::info!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn default_location() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("support-rag").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RAG_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RAG_PERSIST_DIR") {
            self.paths.persist_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RAG_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("RAG_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| Error::Config(format!("RAG_PORT is not a port number: {}", v)))?;
        }
        if let Some(v) = lookup("RAG_LLM_PROVIDER") {
            self.llm.provider = v.parse()?;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = lookup("RAG_EMBED_MODEL") {
            self.embeddings.model = v;
        }
        if let Some(v) = lookup("RAG_GENERATE_MODEL") {
            match self.llm.provider {
                LlmProvider::Ollama => self.llm.generate_model = v,
                LlmProvider::Groq => self.llm.groq_model = v,
            }
        }
        if let Some(v) = lookup("GROQ_API_KEY") {
            if !v.trim().is_empty() {
                self.llm.groq_api_key = Some(v);
            }
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::Config("embeddings.batch_size must be positive".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".into()));
        }
        if !self.retrieval.distance_threshold.is_finite() || self.retrieval.distance_threshold < 0.0 {
            return Err(Error::Config(
                "retrieval.distance_threshold must be a non-negative number".into(),
            ));
        }
        if self.vector_db.hnsw_m == 0
            || self.vector_db.hnsw_ef_construction == 0
            || self.vector_db.hnsw_ef_search == 0
        {
            return Err(Error::Config("vector_db HNSW parameters must be positive".into()));
        }
        if self.server.query_timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(Error::Config("timeouts must be positive".into()));
        }
        if self.llm.provider == LlmProvider::Groq && self.llm.groq_api_key.is_none() {
            return Err(Error::Config(
                "GROQ_API_KEY is required when llm.provider = \"groq\"".into(),
            ));
        }
        Ok(())
    }
}

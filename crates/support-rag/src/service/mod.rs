//! Chat and ingestion service shared by the HTTP server and the CLI

pub mod session;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::ingestion::IngestPipeline;
use crate::providers::{embedder_from_config, generator_from_config, Embedder, Generator, VectorIndex};
use crate::storage::SqliteVectorIndex;
use crate::types::{Answer, ChatResponse, IngestOutcome, IngestResponse};

pub use session::{QueryOrchestrator, QuerySession, SessionStatus};

/// Boundary service: `chat` and `ingest` never fail, `try_*` expose the typed result
pub struct RagService {
    config: RagConfig,
    pipeline: IngestPipeline,
    orchestrator: QueryOrchestrator,
    index: Arc<dyn VectorIndex>,
    /// Queries hold it shared, ingestion exclusively
    gate: RwLock<()>,
    query_timeout: Duration,
}

impl RagService {
    /// Assemble the service from explicit collaborators
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let pipeline = IngestPipeline::from_config(&config, Arc::clone(&embedder), Arc::clone(&index));
        let orchestrator = QueryOrchestrator::new(
            embedder,
            Arc::clone(&index),
            generator,
            config.retrieval.clone(),
        );
        let query_timeout = Duration::from_secs(config.server.query_timeout_secs);

        Self {
            config,
            pipeline,
            orchestrator,
            index,
            gate: RwLock::new(()),
            query_timeout,
        }
    }

    /// Open the on-disk index and the configured model providers
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let index_path = config.paths.index_path();
        let index: Arc<dyn VectorIndex> = Arc::new(SqliteVectorIndex::open_with(
            &index_path,
            config.vector_db.clone(),
        )?);
        let embedder = embedder_from_config(&config)?;
        let generator = generator_from_config(&config)?;

        tracing::info!(
            "Using index {} with embedder {} and generator {}",
            index_path.display(),
            embedder.name(),
            generator.name()
        );
        Ok(Self::new(config, embedder, index, generator))
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Answer a question, returning the typed error on failure
    pub async fn try_chat(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::invalid_request("question must not be empty"));
        }

        let work = async {
            let _guard = self.gate.read().await;
            self.orchestrator.answer(question).await
        };

        tokio::time::timeout(self.query_timeout, work)
            .await
            .map_err(|_| {
                Error::timeout(format!(
                    "answering a question took longer than {}s",
                    self.query_timeout.as_secs()
                ))
            })?
    }

    /// Answer a question; failures become a structured error response
    pub async fn chat(&self, question: &str) -> ChatResponse {
        match self.try_chat(question).await {
            Ok(answer) => answer.into(),
            Err(e) => {
                tracing::warn!("Chat failed: {}", e);
                ChatResponse::from(&e)
            }
        }
    }

    /// Rebuild the index from the configured data folder
    pub async fn try_ingest(&self) -> Result<IngestOutcome> {
        self.try_ingest_from(&self.config.paths.data_dir).await
    }

    /// Rebuild the index from `root`
    pub async fn try_ingest_from(&self, root: &Path) -> Result<IngestOutcome> {
        let _guard = self.gate.write().await;
        let result = self.pipeline.run(root).await;
        self.orchestrator.invalidate().await;
        result
    }

    /// Rebuild the index; failures become a structured error response
    pub async fn ingest(&self) -> IngestResponse {
        match self.try_ingest().await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                tracing::error!("Ingestion failed: {}", e);
                IngestResponse::from(&e)
            }
        }
    }

    pub async fn status(&self) -> SessionStatus {
        self.orchestrator.status().await
    }

    /// Number of records in the index
    pub async fn record_count(&self) -> Result<usize> {
        self.index.count().await
    }
}

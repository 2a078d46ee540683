//! Query session lifecycle
//!
//! A [`QuerySession`] bundles the retriever and synthesizer built against the
//! current index. The orchestrator builds it lazily on first use, caches it,
//! and drops it when ingestion rewrites the index.
//!
//! ```text
//! Uninitialized --session()--> Ready            (index has records)
//! Uninitialized --session()--> Failed           (index empty)
//! Ready | Failed --invalidate()--> Uninitialized
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::generation::AnswerSynthesizer;
use crate::providers::{Embedder, Generator, VectorIndex};
use crate::retrieval::Retriever;
use crate::types::Answer;

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    Ready,
    EmptyIndex,
}

enum SessionState {
    Uninitialized,
    Ready(Arc<QuerySession>),
    Failed,
}

/// Retriever and synthesizer for one generation of the index
pub struct QuerySession {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl QuerySession {
    pub fn new(retriever: Retriever, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            retriever,
            synthesizer,
        }
    }

    /// Retrieve grounding chunks and synthesize a cited answer
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let chunks = self.retriever.retrieve(question).await?;
        self.synthesizer.synthesize(question, &chunks).await
    }
}

/// Owns the cached query session
pub struct QueryOrchestrator {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
    retrieval: RetrievalConfig,
    state: Mutex<SessionState>,
}

impl QueryOrchestrator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
            retrieval,
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    /// Current session, building it on first use
    pub async fn session(&self) -> Result<Arc<QuerySession>> {
        let mut state = self.state.lock().await;
        match &*state {
            SessionState::Ready(session) => return Ok(Arc::clone(session)),
            SessionState::Failed => return Err(Error::EmptyIndex),
            SessionState::Uninitialized => {}
        }

        let records = self.index.count().await?;
        if records == 0 {
            tracing::warn!("Vector index is empty, queries disabled until ingestion runs");
            *state = SessionState::Failed;
            return Err(Error::EmptyIndex);
        }

        let session = Arc::new(QuerySession::new(
            Retriever::new(
                Arc::clone(&self.embedder),
                Arc::clone(&self.index),
                self.retrieval.clone(),
            ),
            AnswerSynthesizer::new(Arc::clone(&self.generator)),
        ));
        tracing::info!(
            "Query session ready ({} records, generator {}:{})",
            records,
            self.generator.name(),
            self.generator.model()
        );
        *state = SessionState::Ready(Arc::clone(&session));
        Ok(session)
    }

    /// Answer a question with the current session
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let session = self.session().await?;
        session.answer(question).await
    }

    /// Drop the cached session so the next query rebuilds it
    pub async fn invalidate(&self) {
        *self.state.lock().await = SessionState::Uninitialized;
        tracing::debug!("Query session invalidated");
    }

    /// Invalidate and build immediately
    pub async fn rebuild(&self) -> Result<Arc<QuerySession>> {
        self.invalidate().await;
        self.session().await
    }

    pub async fn status(&self) -> SessionStatus {
        match &*self.state.lock().await {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::Ready(_) => SessionStatus::Ready,
            SessionState::Failed => SessionStatus::EmptyIndex,
        }
    }
}

//! Folder ingestion: walk, load, chunk, embed, replace the index

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

use super::chunker::RecursiveCharacterSplitter;
use super::loader::LoaderRegistry;
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{Embedder, VectorIndex};
use crate::types::{Chunk, Document, DocumentMetadata, IndexedRecord, IngestOutcome};

/// Ingestion pipeline over a data folder
pub struct IngestPipeline {
    registry: LoaderRegistry,
    splitter: RecursiveCharacterSplitter,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
}

impl IngestPipeline {
    pub fn new(
        registry: LoaderRegistry,
        splitter: RecursiveCharacterSplitter,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        batch_size: usize,
    ) -> Self {
        Self {
            registry,
            splitter,
            embedder,
            index,
            batch_size: batch_size.max(1),
        }
    }

    /// Pipeline with the default loaders and configured chunking
    pub fn from_config(
        config: &RagConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self::new(
            LoaderRegistry::with_defaults(),
            RecursiveCharacterSplitter::from_config(&config.chunking),
            embedder,
            index,
            config.embeddings.batch_size,
        )
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Supported files under `root`, as absolute paths in deterministic order
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::NotFound(root.to_path_buf()));
        }
        let root = std::fs::canonicalize(root)
            .map_err(|e| Error::load(root, format!("cannot resolve data folder: {}", e)))?;

        let mut files = Vec::new();
        let mut skipped = 0usize;
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&root).to_path_buf();
                Error::load(path, e.to_string())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if self.registry.loader_for(entry.path()).is_some() {
                files.push(entry.into_path());
            } else {
                skipped += 1;
                tracing::debug!("Skipping unsupported file {}", entry.path().display());
            }
        }

        tracing::info!(
            "Found {} supported files under {} ({} skipped)",
            files.len(),
            root.display(),
            skipped
        );
        Ok(files)
    }

    /// Load every supported file; a single failing file aborts the run
    pub async fn load_documents(&self, files: &[PathBuf]) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for path in files {
            let Some(loader) = self.registry.loader_for(path) else {
                continue;
            };
            let stamp = DocumentMetadata::for_file(path);
            let loaded = loader.load(path).await?;
            tracing::debug!("Loaded {} documents from {}", loaded.len(), path.display());

            documents.extend(loaded.into_iter().map(|mut doc| {
                doc.metadata.source = stamp.source.clone();
                doc.metadata.path = stamp.path.clone();
                doc
            }));
        }
        Ok(documents)
    }

    /// Embed chunks in batches, preserving order
    pub async fn embed_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<IndexedRecord>> {
        let mut records = Vec::with_capacity(chunks.len());
        let total = chunks.len();

        for (batch_no, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            records.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| IndexedRecord::from_chunk(chunk, embedding)),
            );
            tracing::debug!(
                "Embedded batch {} ({}/{} chunks)",
                batch_no + 1,
                records.len(),
                total
            );
        }

        Ok(records)
    }

    /// Rebuild the index from everything under `root`
    pub async fn run(&self, root: &Path) -> Result<IngestOutcome> {
        let started = Instant::now();
        tracing::info!("Starting ingestion from {}", root.display());

        let files = self.discover(root)?;
        let documents = self.load_documents(&files).await?;
        if documents.is_empty() {
            tracing::info!("No documents found under {}", root.display());
            return Ok(IngestOutcome::NoDocuments);
        }
        tracing::info!("Loaded {} documents from {} files", documents.len(), files.len());

        let chunks = self.splitter.split_documents(&documents);
        if chunks.is_empty() {
            tracing::info!("Documents under {} contain no text", root.display());
            return Ok(IngestOutcome::NoDocuments);
        }
        tracing::info!("Created {} chunks", chunks.len());

        let chunk_count = chunks.len();
        let records = self.embed_chunks(chunks).await?;
        self.index.replace_all(records).await?;

        tracing::info!(
            "Ingestion finished: {} files, {} documents, {} chunks in {:.1}s",
            files.len(),
            documents.len(),
            chunk_count,
            started.elapsed().as_secs_f32()
        );

        Ok(IngestOutcome::Indexed {
            files: files.len(),
            documents: documents.len(),
            chunks: chunk_count,
        })
    }
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use support_rag::error::{Error, Result};
use support_rag::providers::{Embedder, Generator, VectorIndex};
use support_rag::storage::SqliteVectorIndex;
use support_rag::{RagConfig, RagService};

pub const DIMENSIONS: usize = 256;

/// Bag-of-words embedder: each lowercase token is hashed into a fixed slot
pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMENSIONS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in token.to_lowercase().bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vector[(hash % DIMENSIONS as u64) as usize] += 1.0;
        }
        if vector.iter().all(|v| *v == 0.0) {
            vector[0] = 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Generator returning a configurable reply and recording every prompt
pub struct ScriptedGenerator {
    reply: Mutex<std::result::Result<String, String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(reply.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_with(&self, reply: &str) {
        *self.reply.lock() = Ok(reply.to_string());
    }

    pub fn fail_with(&self, message: &str) {
        *self.reply.lock() = Err(message.to_string());
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.reply.lock().clone().map_err(Error::generation)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Service over an in-memory index and a temporary data folder
pub struct Harness {
    pub dir: TempDir,
    pub index: SqliteVectorIndex,
    pub generator: Arc<ScriptedGenerator>,
    pub service: Arc<RagService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_reply("Refunds are issued within 14 days.")
    }

    pub fn with_reply(reply: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.paths.data_dir = dir.path().join("docs");
        config.paths.persist_dir = dir.path().join("vectordb");
        std::fs::create_dir_all(&config.paths.data_dir).unwrap();

        let index = SqliteVectorIndex::open_in_memory().unwrap();
        let generator = Arc::new(ScriptedGenerator::new(reply));
        let service = RagService::new(
            config,
            Arc::new(HashingEmbedder),
            Arc::new(index.clone()) as Arc<dyn VectorIndex>,
            Arc::clone(&generator) as Arc<dyn Generator>,
        );

        Self {
            dir,
            index,
            generator,
            service: Arc::new(service),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.service.config().paths.data_dir.clone()
    }

    /// Write `contents` to `name` inside the data folder
    pub fn write_doc(&self, name: &str, contents: &str) -> PathBuf {
        write_file(&self.data_dir(), name, contents)
    }

    pub fn remove_doc(&self, name: &str) {
        std::fs::remove_file(self.data_dir().join(name)).unwrap();
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

pub const REFUND_POLICY: &str = "Refunds are issued within 14 days of purchase to the original payment method.";
pub const SHIPPING_POLICY: &str = "Standard shipping takes five business days. Express shipping arrives overnight.";

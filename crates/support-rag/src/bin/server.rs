//! Support RAG server binary
//!
//! Run with: cargo run -p support-rag --bin support-rag-server [config.toml]

use std::path::PathBuf;

use support_rag::{config::RagConfig, providers::OllamaClient, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "support_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║               Customer Support Assistant                  ║
║          Answers from your documents, with sources        ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RAG_CONFIG").ok())
        .map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Data folder: {}", config.paths.data_dir.display());
    tracing::info!("  - Index: {}", config.paths.index_path().display());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!(
        "  - LLM: {:?} / {}",
        config.llm.provider,
        config.llm.active_model()
    );
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let ollama = OllamaClient::new(&config.llm)?;
    if ollama.health_check().await.unwrap_or(false) {
        tracing::info!("Ollama is running");
    } else {
        tracing::warn!("Ollama not available at {}", config.llm.base_url);
        tracing::warn!("Please start Ollama:");
        tracing::warn!("  1. Start: ollama serve");
        tracing::warn!(
            "  2. Pull models: ollama pull {} && ollama pull {}",
            config.embeddings.model,
            config.llm.generate_model
        );
    }

    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  Chat UI: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /chat   - Ask a question");
    println!("  POST /ingest - Rebuild the knowledge base from the data folder");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

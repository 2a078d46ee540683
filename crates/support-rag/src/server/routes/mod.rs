//! Routes for the support RAG server

pub mod chat;
pub mod ingest;

use axum::{
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Chat and ingestion routes served at the root
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/ingest", post(ingest::ingest))
}

/// Informational routes nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "support-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Customer support assistant answering from ingested documents with source citations",
        "endpoints": {
            "GET /": "Chat page",
            "GET /health": "Liveness check",
            "GET /ready": "Readiness check (503 until the index has records)",
            "POST /chat": "Ask a question: {\"question\": \"...\"}",
            "POST /ingest": "Rebuild the index from the data folder",
            "GET /api/info": "This document"
        },
        "formats": ["pdf", "txt", "docx", "md", "csv"]
    }))
}

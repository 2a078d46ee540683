//! HTTP server for the support RAG service

pub mod routes;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Support RAG HTTP server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a server, opening the index and providers from `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        build_router(self.state.clone(), self.config.server.enable_cors)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting support RAG server on http://{}", addr);
        tracing::info!("API documentation: http://{}/api/info", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Router over `state`; CORS is permissive when enabled
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .merge(routes::service_routes())
        .nest("/api", routes::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Chat page
async fn chat_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check endpoint: ready once the index holds records
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let session = state.service().status().await;
    match state.service().record_count().await {
        Ok(records) if records > 0 => (
            StatusCode::OK,
            Json(json!({ "status": session, "records": records })),
        ),
        Ok(records) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "empty_index", "records": records })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "error": e.to_string() })),
        ),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

//! Ingestion endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::server::state::AppState;
use crate::types::IngestResponse;

/// POST /ingest - rebuild the index from the configured data folder
pub async fn ingest(State(state): State<AppState>) -> Json<IngestResponse> {
    let start = Instant::now();
    let data_dir = state.config().paths.data_dir.clone();

    tracing::info!("Ingestion requested for {}", data_dir.display());

    let response = state.service().ingest().await;

    tracing::info!(
        "Ingestion finished with status {:?} in {}ms",
        response.status,
        start.elapsed().as_millis()
    );

    Json(response)
}

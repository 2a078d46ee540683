//! Chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /chat - answer a question from the indexed documents
///
/// Malformed bodies and blank questions are rejected with 400. Every other
/// outcome, including an empty index or a model failure, is a 200 whose body
/// carries `error` and `error_kind`.
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|rejection| Error::invalid_request(rejection.body_text()))?;
    let question = request.validated_question()?;
    let start = Instant::now();

    tracing::info!("Question: \"{}\"", question);

    let response = state.service().chat(question).await;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        sources = response.sources.len(),
        error_kind = response.error_kind.map(|k| k.as_str()),
        "Chat answered"
    );

    Ok(Json(response))
}

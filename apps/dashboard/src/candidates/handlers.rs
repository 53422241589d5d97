//! Axum route handlers for search and the displayed candidate list.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::candidates::models::CandidateRecord;
use crate::errors::AppError;
use crate::session::orchestrator::{run_search, SearchOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub result_limit: Option<u32>,
    pub threshold: Option<f64>,
}

/// POST /api/v1/search
///
/// Runs the query against the search service and normalizes the result.
/// `applied` is false when a newer search superseded this one.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, AppError> {
    let result_limit = request
        .result_limit
        .unwrap_or(state.config.search_result_limit);
    let threshold = request.threshold.or(state.config.search_threshold);

    let outcome = run_search(
        &state.session,
        state.gateway.as_ref(),
        &request.query,
        result_limit,
        threshold,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(State(state): State<AppState>) -> Json<Vec<CandidateRecord>> {
    Json(state.session.lock().await.candidates().to_vec())
}

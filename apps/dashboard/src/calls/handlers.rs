//! Axum route handlers for the shortlist and pre-screening calls.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::calls::state_machine::ShortlistedCandidate;
use crate::errors::AppError;
use crate::gateway::CallStatusReport;
use crate::session::orchestrator::{initiate_call, record_call_status};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub candidate_id: String,
}

/// POST /api/v1/shortlist
///
/// Shortlists a displayed candidate. Repeating it returns the existing entry.
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Json(request): Json<ShortlistRequest>,
) -> Result<Json<ShortlistedCandidate>, AppError> {
    let mut session = state.session.lock().await;
    let shortlisted = session.shortlist(&request.candidate_id)?.clone();
    Ok(Json(shortlisted))
}

/// GET /api/v1/shortlist
pub async fn handle_list_shortlist(
    State(state): State<AppState>,
) -> Json<Vec<ShortlistedCandidate>> {
    Json(state.session.lock().await.shortlisted().to_vec())
}

/// POST /api/v1/shortlist/:id/call
///
/// Initiates a pre-screening call. 409 if a call was already started.
pub async fn handle_initiate_call(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<Json<ShortlistedCandidate>, AppError> {
    let candidate = initiate_call(&state.session, state.gateway.as_ref(), &candidate_id).await?;
    Ok(Json(candidate))
}

/// POST /api/v1/calls/status
///
/// Call-status webhook. The transition is validated, forwarded to the call
/// service, then committed.
pub async fn handle_call_status(
    State(state): State<AppState>,
    Json(report): Json<CallStatusReport>,
) -> Result<Json<ShortlistedCandidate>, AppError> {
    let candidate = record_call_status(&state.session, state.gateway.as_ref(), report).await?;
    Ok(Json(candidate))
}

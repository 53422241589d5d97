//! Axum route handlers for outreach drafts and status.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::candidates::models::{Channel, ChannelStatus};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OutreachDraftResponse {
    pub candidate_id: String,
    pub channel: Channel,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct OutreachStatusRequest {
    pub status: ChannelStatus,
}

#[derive(Debug, Serialize)]
pub struct OutreachStatusResponse {
    pub candidate_id: String,
    pub channel: Channel,
    pub previous: ChannelStatus,
    pub status: ChannelStatus,
}

/// GET /api/v1/candidates/:id/outreach/:channel
///
/// Returns an editable draft. The channel moves to `pending` if untouched.
pub async fn handle_draft_outreach(
    State(state): State<AppState>,
    Path((candidate_id, channel)): Path<(String, Channel)>,
) -> Result<Json<OutreachDraftResponse>, AppError> {
    let message = state
        .session
        .lock()
        .await
        .draft_outreach(&candidate_id, channel)?;

    Ok(Json(OutreachDraftResponse {
        candidate_id,
        channel,
        message,
    }))
}

/// PATCH /api/v1/candidates/:id/outreach/:channel
///
/// Advances the channel status. Statuses never move backwards.
pub async fn handle_update_outreach(
    State(state): State<AppState>,
    Path((candidate_id, channel)): Path<(String, Channel)>,
    Json(request): Json<OutreachStatusRequest>,
) -> Result<Json<OutreachStatusResponse>, AppError> {
    let previous = state
        .session
        .lock()
        .await
        .advance_outreach(&candidate_id, channel, request.status)?;

    Ok(Json(OutreachStatusResponse {
        candidate_id,
        channel,
        previous,
        status: request.status,
    }))
}

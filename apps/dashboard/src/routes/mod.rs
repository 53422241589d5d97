pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::calls::handlers as calls;
use crate::candidates::handlers as candidates;
use crate::outreach::handlers as outreach;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Search and candidates
        .route("/api/v1/search", post(candidates::handle_search))
        .route("/api/v1/candidates", get(candidates::handle_list_candidates))
        // Outreach
        .route(
            "/api/v1/candidates/:id/outreach/:channel",
            get(outreach::handle_draft_outreach).patch(outreach::handle_update_outreach),
        )
        // Shortlist and calls
        .route(
            "/api/v1/shortlist",
            get(calls::handle_list_shortlist).post(calls::handle_shortlist),
        )
        .route("/api/v1/shortlist/:id/call", post(calls::handle_initiate_call))
        .route("/api/v1/calls/status", post(calls::handle_call_status))
        .with_state(state)
}

//! Async flows that combine the gateway with session state.
//!
//! The session lock is taken only around synchronous state changes and is never
//! held across an external call.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::calls::state_machine::{CallEvent, ShortlistedCandidate};
use crate::candidates::models::CandidateRecord;
use crate::candidates::normalizer::normalize_search_response;
use crate::errors::AppError;
use crate::gateway::{CallStatusReport, Gateway};
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub search_id: u64,
    /// False when a newer search was issued while this one was outstanding.
    pub applied: bool,
    pub candidates: Vec<CandidateRecord>,
}

/// search → normalize → apply to the displayed list unless superseded.
/// Failures leave the displayed list unchanged.
pub async fn run_search(
    session: &Mutex<Session>,
    gateway: &dyn Gateway,
    query: &str,
    result_limit: u32,
    threshold: Option<f64>,
) -> Result<SearchOutcome, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    if result_limit == 0 {
        return Err(AppError::Validation("result_limit must be at least 1".to_string()));
    }

    let search_id = session.lock().await.begin_search();
    info!("Search {search_id} issued: '{query}'");

    let raw = gateway
        .search(query, result_limit, threshold)
        .await
        .inspect_err(|e| error!("Search {search_id} failed: {e}"))?;

    let records = normalize_search_response(&raw)
        .inspect_err(|e| error!("Search {search_id} could not be normalized: {e}"))?;

    let applied = session
        .lock()
        .await
        .complete_search(search_id, records.clone())
        .map(<[CandidateRecord]>::to_vec);

    match applied {
        Some(candidates) => {
            info!("Search {search_id} applied: {} candidates", candidates.len());
            Ok(SearchOutcome {
                search_id,
                applied: true,
                candidates,
            })
        }
        None => {
            info!("Search {search_id} superseded; result not applied");
            Ok(SearchOutcome {
                search_id,
                applied: false,
                candidates: records,
            })
        }
    }
}

/// Starts a pre-screening call. Rejected before any network call unless the
/// candidate is shortlisted, `not_started`, and has no initiation outstanding.
pub async fn initiate_call(
    session: &Mutex<Session>,
    gateway: &dyn Gateway,
    candidate_id: &str,
) -> Result<ShortlistedCandidate, AppError> {
    session
        .lock()
        .await
        .begin_call(candidate_id)
        .inspect_err(|e| warn!("Call initiation for {candidate_id} rejected: {e}"))?;

    let result = gateway.initiate_call(candidate_id).await;
    if let Err(e) = &result {
        error!("Call initiation for {candidate_id} failed: {e}");
    }

    let mut guard = session.lock().await;
    let candidate = guard.finish_call(candidate_id, result)?.clone();
    Ok(candidate)
}

/// Applies an external call-status report: the transition is validated first,
/// the report is forwarded to the call service, and the state changes only on ack.
/// One call update per candidate may be outstanding at a time.
pub async fn record_call_status(
    session: &Mutex<Session>,
    gateway: &dyn Gateway,
    report: CallStatusReport,
) -> Result<ShortlistedCandidate, AppError> {
    let candidate_id = report.applicant_id.clone();
    let event = CallEvent::from_report(
        report.status,
        report.summary.clone(),
        report.score,
        report.reschedule_date,
    )
    .inspect_err(|e| warn!("Status report for {candidate_id} rejected: {e}"))?;

    session
        .lock()
        .await
        .begin_call_report(&candidate_id, &event)
        .inspect_err(|e| warn!("Status report for {candidate_id} rejected: {e}"))?;

    let result = gateway.report_call_status(&report).await;
    if let Err(e) = &result {
        error!("Reporting call status for {candidate_id} failed: {e}");
    }

    let mut guard = session.lock().await;
    let candidate = guard.finish_call_report(&candidate_id, event, result)?.clone();
    Ok(candidate)
}

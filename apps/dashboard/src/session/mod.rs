//! Recruiter session state: the displayed search results, the shortlist,
//! outreach progress per candidate, and which call updates are outstanding.
//!
//! `Session` is plain synchronous state. The async flows that talk to the
//! gateway live in `orchestrator` and only lock the session between external calls.

pub mod orchestrator;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::calls::state_machine::{CallEvent, CallStatus, ShortlistedCandidate};
use crate::candidates::models::{CandidateRecord, Channel, ChannelStatus, OutreachStatus};
use crate::errors::AppError;
use crate::gateway::{CallInitiationResult, GatewayError};
use crate::outreach::generator::generate;
use crate::outreach::status::{advance, check_advance};

#[derive(Debug, Default)]
pub struct Session {
    displayed: Vec<CandidateRecord>,
    latest_search: u64,
    shortlist: Vec<ShortlistedCandidate>,
    /// Highest outreach status seen per candidate id, across searches.
    outreach_progress: HashMap<String, OutreachStatus>,
    calls_in_flight: HashSet<String>,
    reports_in_flight: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[CandidateRecord] {
        &self.displayed
    }

    pub fn shortlisted(&self) -> &[ShortlistedCandidate] {
        &self.shortlist
    }

    /// Issues a new search id. Any search issued earlier is now stale.
    pub fn begin_search(&mut self) -> u64 {
        self.latest_search += 1;
        self.latest_search
    }

    /// Replaces the displayed list if `search_id` is still the latest issued search.
    /// Returns the displayed list when applied, `None` when the result was stale.
    ///
    /// Outreach progress already known for a candidate id is carried onto the
    /// fresh record, whether or not the candidate was shortlisted.
    pub fn complete_search(
        &mut self,
        search_id: u64,
        mut records: Vec<CandidateRecord>,
    ) -> Option<&[CandidateRecord]> {
        if search_id != self.latest_search {
            debug!(
                "Discarding stale search {search_id} (latest is {})",
                self.latest_search
            );
            return None;
        }

        for record in &mut records {
            let known = self
                .outreach_progress
                .entry(record.id.clone())
                .or_default();
            for channel in [Channel::Linkedin, Channel::Email] {
                let status = record.outreach.get(channel).max(known.get(channel));
                record.outreach.set(channel, status);
                known.set(channel, status);
            }
        }

        self.displayed = records;
        Some(&self.displayed)
    }

    /// Looks a candidate up in the displayed list, then in the shortlist.
    pub fn find_candidate(&self, candidate_id: &str) -> Option<&CandidateRecord> {
        self.displayed
            .iter()
            .find(|c| c.id == candidate_id)
            .or_else(|| self.shortlisted_candidate(candidate_id).map(|s| &s.candidate))
    }

    pub fn shortlisted_candidate(&self, candidate_id: &str) -> Option<&ShortlistedCandidate> {
        self.shortlist.iter().find(|s| s.id() == candidate_id)
    }

    fn shortlisted_mut(&mut self, candidate_id: &str) -> Result<&mut ShortlistedCandidate, AppError> {
        self.shortlist
            .iter_mut()
            .find(|s| s.id() == candidate_id)
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} is not shortlisted")))
    }

    /// Shortlists a displayed candidate. Shortlisting twice returns the existing entry.
    pub fn shortlist(&mut self, candidate_id: &str) -> Result<&ShortlistedCandidate, AppError> {
        if let Some(index) = self.shortlist.iter().position(|s| s.id() == candidate_id) {
            return Ok(&self.shortlist[index]);
        }

        let candidate = self
            .displayed
            .iter()
            .find(|c| c.id == candidate_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

        info!("Shortlisted candidate {} ({})", candidate.id, candidate.name);
        self.shortlist.push(ShortlistedCandidate::new(candidate));
        Ok(&self.shortlist[self.shortlist.len() - 1])
    }

    /// Drafts outreach for `channel`. A channel that was never touched moves to `pending`.
    pub fn draft_outreach(&mut self, candidate_id: &str, channel: Channel) -> Result<String, AppError> {
        let candidate = self
            .find_candidate(candidate_id)
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

        let message = generate(candidate, channel);
        if candidate.outreach.get(channel) == ChannelStatus::NotStarted {
            self.advance_outreach(candidate_id, channel, ChannelStatus::Pending)?;
        }
        Ok(message)
    }

    /// Moves `channel` forward on every copy of the candidate the session holds.
    /// Validated on all copies before any is changed.
    pub fn advance_outreach(
        &mut self,
        candidate_id: &str,
        channel: Channel,
        to: ChannelStatus,
    ) -> Result<ChannelStatus, AppError> {
        let displayed = self.displayed.iter_mut().filter(|c| c.id == candidate_id);
        let shortlisted = self
            .shortlist
            .iter_mut()
            .filter(|s| s.id() == candidate_id)
            .map(|s| &mut s.candidate);
        let mut copies: Vec<&mut CandidateRecord> = displayed.chain(shortlisted).collect();

        if copies.is_empty() {
            return Err(AppError::NotFound(format!("Candidate {candidate_id} not found")));
        }
        for copy in &copies {
            check_advance(&copy.outreach, channel, to)?;
        }

        let mut previous = to;
        for copy in &mut copies {
            previous = previous.min(advance(&mut copy.outreach, channel, to)?);
        }
        let progress = self
            .outreach_progress
            .entry(candidate_id.to_string())
            .or_default();
        progress.set(channel, progress.get(channel).max(to));

        if to == ChannelStatus::Sent {
            // Delivery is handled outside the dashboard; only the status is tracked.
            info!("Outreach via {} marked sent for candidate {candidate_id}", channel.as_str());
        }
        Ok(previous)
    }

    /// Guards a call initiation: the candidate must be shortlisted, `not_started`,
    /// and have no call update outstanding. Marks the initiation outstanding.
    pub fn begin_call(&mut self, candidate_id: &str) -> Result<(), AppError> {
        let status = self.shortlisted_mut(candidate_id)?.call_status();
        if status != CallStatus::NotStarted
            || self.calls_in_flight.contains(candidate_id)
            || self.reports_in_flight.contains(candidate_id)
        {
            return Err(AppError::CallAlreadyInitiated {
                candidate_id: candidate_id.to_string(),
                status,
            });
        }
        self.calls_in_flight.insert(candidate_id.to_string());
        Ok(())
    }

    /// Settles an outstanding initiation with the gateway's result.
    pub fn finish_call(
        &mut self,
        candidate_id: &str,
        result: Result<CallInitiationResult, GatewayError>,
    ) -> Result<&ShortlistedCandidate, AppError> {
        self.calls_in_flight.remove(candidate_id);
        let _ack = result?;

        let candidate = self.shortlisted_mut(candidate_id)?;
        candidate.apply(CallEvent::Initiated)?;
        Ok(candidate)
    }

    fn ensure_no_call_update(&self, candidate_id: &str) -> Result<(), AppError> {
        if self.calls_in_flight.contains(candidate_id) || self.reports_in_flight.contains(candidate_id) {
            return Err(AppError::CallUpdateInFlight {
                candidate_id: candidate_id.to_string(),
            });
        }
        Ok(())
    }

    /// Validates a reported call event and marks the report outstanding.
    /// Rejected while an initiation or another report for the candidate is pending.
    pub fn begin_call_report(&mut self, candidate_id: &str, event: &CallEvent) -> Result<(), AppError> {
        self.ensure_no_call_update(candidate_id)?;
        let candidate = self
            .shortlisted_candidate(candidate_id)
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} is not shortlisted")))?;
        candidate.check(event)?;

        self.reports_in_flight.insert(candidate_id.to_string());
        Ok(())
    }

    /// Settles an outstanding report. The event is committed only on ack.
    pub fn finish_call_report(
        &mut self,
        candidate_id: &str,
        event: CallEvent,
        result: Result<(), GatewayError>,
    ) -> Result<&ShortlistedCandidate, AppError> {
        self.reports_in_flight.remove(candidate_id);
        result?;
        self.ensure_no_call_update(candidate_id)?;

        let candidate = self.shortlisted_mut(candidate_id)?;
        let from = candidate.apply(event)?;
        info!(
            "Call status for candidate {candidate_id}: {from} -> {}",
            candidate.call_status()
        );
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record(id: &str) -> CandidateRecord {
        CandidateRecord::new(id, format!("Candidate {id}"), 50.0)
    }

    fn session_with(ids: &[&str]) -> Session {
        let mut session = Session::new();
        let search = session.begin_search();
        session.complete_search(search, ids.iter().map(|id| record(id)).collect());
        session
    }

    fn ack() -> Result<CallInitiationResult, GatewayError> {
        Ok(CallInitiationResult {
            call_id: None,
            raw: Value::Null,
        })
    }

    #[test]
    fn test_only_latest_search_is_applied() {
        let mut session = Session::new();
        let first = session.begin_search();
        let second = session.begin_search();

        assert!(session.complete_search(second, vec![record("new")]).is_some());
        assert!(session.complete_search(first, vec![record("old")]).is_none());

        let ids: Vec<&str> = session.candidates().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn test_stale_result_arriving_first_is_still_discarded() {
        let mut session = session_with(&["current"]);
        let older = session.begin_search();
        let newer = session.begin_search();

        assert!(session.complete_search(older, vec![record("older")]).is_none());
        assert_eq!(session.candidates()[0].id, "current");
        assert!(session.complete_search(newer, vec![record("newer")]).is_some());
    }

    #[test]
    fn test_shortlist_is_idempotent() {
        let mut session = session_with(&["1", "2"]);
        session.shortlist("1").unwrap();
        session.shortlist("1").unwrap();
        assert_eq!(session.shortlisted().len(), 1);
    }

    #[test]
    fn test_shortlist_unknown_candidate_is_not_found() {
        let mut session = session_with(&["1"]);
        assert!(matches!(session.shortlist("9"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_shortlist_survives_new_search() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        let next = session.begin_search();
        session.complete_search(next, vec![record("2")]);
        assert_eq!(session.shortlisted()[0].id(), "1");
        assert!(session.find_candidate("1").is_some());
    }

    #[test]
    fn test_begin_call_rejects_when_outstanding() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.begin_call("1").unwrap();
        assert!(matches!(
            session.begin_call("1"),
            Err(AppError::CallAlreadyInitiated { .. })
        ));
    }

    #[test]
    fn test_begin_call_rejects_non_shortlisted() {
        let mut session = session_with(&["1"]);
        assert!(matches!(session.begin_call("1"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_finish_call_success_moves_to_in_progress() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.begin_call("1").unwrap();
        let candidate = session.finish_call("1", ack()).unwrap();
        assert_eq!(candidate.call_status(), CallStatus::InProgress);

        assert!(matches!(
            session.begin_call("1"),
            Err(AppError::CallAlreadyInitiated {
                status: CallStatus::InProgress,
                ..
            })
        ));
    }

    #[test]
    fn test_finish_call_failure_leaves_not_started_and_allows_retry() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.begin_call("1").unwrap();
        let err = session
            .finish_call("1", Err(GatewayError::Transport("timed out".to_string())))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(
            session.shortlisted_candidate("1").unwrap().call_status(),
            CallStatus::NotStarted
        );
        session.begin_call("1").unwrap();
    }

    #[test]
    fn test_draft_outreach_marks_pending_on_all_copies() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        let message = session.draft_outreach("1", Channel::Linkedin).unwrap();
        assert!(message.starts_with("Hi Candidate 1,"));

        assert_eq!(session.candidates()[0].outreach.linkedin, ChannelStatus::Pending);
        assert_eq!(
            session.shortlisted()[0].candidate.outreach.linkedin,
            ChannelStatus::Pending
        );
        assert_eq!(session.candidates()[0].outreach.email, ChannelStatus::NotStarted);
    }

    #[test]
    fn test_draft_outreach_does_not_downgrade() {
        let mut session = session_with(&["1"]);
        session.advance_outreach("1", Channel::Email, ChannelStatus::Sent).unwrap();
        session.draft_outreach("1", Channel::Email).unwrap();
        assert_eq!(session.candidates()[0].outreach.email, ChannelStatus::Sent);
    }

    #[test]
    fn test_advance_outreach_backwards_changes_nothing() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.advance_outreach("1", Channel::Email, ChannelStatus::Responded).unwrap();
        assert!(session
            .advance_outreach("1", Channel::Email, ChannelStatus::Sent)
            .is_err());
        assert_eq!(session.candidates()[0].outreach.email, ChannelStatus::Responded);
        assert_eq!(
            session.shortlisted()[0].candidate.outreach.email,
            ChannelStatus::Responded
        );
    }

    #[test]
    fn test_new_search_keeps_known_outreach_progress() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.advance_outreach("1", Channel::Linkedin, ChannelStatus::Sent).unwrap();

        let next = session.begin_search();
        session.complete_search(next, vec![record("1")]);
        assert_eq!(session.candidates()[0].outreach.linkedin, ChannelStatus::Sent);
    }

    #[test]
    fn test_new_search_keeps_outreach_progress_without_shortlisting() {
        let mut session = session_with(&["8"]);
        session.advance_outreach("8", Channel::Email, ChannelStatus::Sent).unwrap();

        let other = session.begin_search();
        session.complete_search(other, vec![record("9")]);
        let again = session.begin_search();
        session.complete_search(again, vec![record("8")]);

        assert_eq!(session.candidates()[0].outreach.email, ChannelStatus::Sent);
        assert!(session
            .advance_outreach("8", Channel::Email, ChannelStatus::Pending)
            .is_err());
    }

    #[test]
    fn test_outreach_status_from_a_search_is_remembered() {
        let mut session = Session::new();
        let first = session.begin_search();
        let mut replied = record("3");
        replied.outreach.linkedin = ChannelStatus::Responded;
        session.complete_search(first, vec![replied]);

        let second = session.begin_search();
        session.complete_search(second, vec![record("3")]);
        assert_eq!(session.candidates()[0].outreach.linkedin, ChannelStatus::Responded);
    }

    fn in_progress_session() -> Session {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.begin_call("1").unwrap();
        session.finish_call("1", ack()).unwrap();
        session
    }

    #[test]
    fn test_begin_call_report_does_not_mutate() {
        let mut session = in_progress_session();
        session.begin_call_report("1", &CallEvent::PickedUp).unwrap();
        assert_eq!(
            session.shortlisted_candidate("1").unwrap().call_status(),
            CallStatus::InProgress
        );
    }

    #[test]
    fn test_invalid_report_is_rejected_without_marking() {
        let mut session = in_progress_session();
        let completed = CallEvent::Completed {
            summary: "early".to_string(),
            screening_score: 50,
        };
        assert!(matches!(
            session.begin_call_report("1", &completed),
            Err(AppError::Transition(_))
        ));
        session.begin_call_report("1", &CallEvent::PickedUp).unwrap();
    }

    #[test]
    fn test_report_rejected_while_initiation_outstanding() {
        let mut session = session_with(&["1"]);
        session.shortlist("1").unwrap();
        session.begin_call("1").unwrap();

        assert!(matches!(
            session.begin_call_report("1", &CallEvent::Disconnected),
            Err(AppError::CallUpdateInFlight { .. })
        ));

        let candidate = session.finish_call("1", ack()).unwrap();
        assert_eq!(candidate.call_status(), CallStatus::InProgress);
    }

    #[test]
    fn test_overlapping_reports_are_rejected() {
        let mut session = in_progress_session();
        session.begin_call_report("1", &CallEvent::PickedUp).unwrap();

        assert!(matches!(
            session.begin_call_report("1", &CallEvent::Disconnected),
            Err(AppError::CallUpdateInFlight { .. })
        ));
        assert!(matches!(
            session.begin_call("1"),
            Err(AppError::CallAlreadyInitiated { .. })
        ));

        let candidate = session
            .finish_call_report("1", CallEvent::PickedUp, Ok(()))
            .unwrap();
        assert_eq!(candidate.call_status(), CallStatus::PickedUp);
        session.begin_call_report("1", &CallEvent::Disconnected).unwrap();
    }

    #[test]
    fn test_failed_report_clears_mark_and_keeps_state() {
        let mut session = in_progress_session();
        session.begin_call_report("1", &CallEvent::PickedUp).unwrap();

        let err = session
            .finish_call_report(
                "1",
                CallEvent::PickedUp,
                Err(GatewayError::Transport("reset".to_string())),
            )
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(
            session.shortlisted_candidate("1").unwrap().call_status(),
            CallStatus::InProgress
        );
        session.begin_call_report("1", &CallEvent::PickedUp).unwrap();
    }
}

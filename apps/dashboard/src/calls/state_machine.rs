//! Call lifecycle: the single source of truth for a shortlisted candidate's
//! pre-screening call status.
//!
//! ```text
//! not_started ──Initiated──▶ in_progress ──PickedUp──▶ picked_up ──Completed──▶ conversation_ended
//!                                 │                        │
//!                                 └──────Disconnected──────┴──────────────────▶ hung_up
//! in_progress | picked_up | rescheduled ──Rescheduled──▶ rescheduled
//! ```
//!
//! `not_started` is left only through `Initiated`. `conversation_ended` and
//! `hung_up` are terminal. A rejected event leaves the
//! candidate untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidates::models::CandidateRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    NotStarted,
    InProgress,
    PickedUp,
    ConversationEnded,
    HungUp,
    Rescheduled,
}

impl CallStatus {
    pub const ALL: [CallStatus; 6] = [
        CallStatus::NotStarted,
        CallStatus::InProgress,
        CallStatus::PickedUp,
        CallStatus::ConversationEnded,
        CallStatus::HungUp,
        CallStatus::Rescheduled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::ConversationEnded | CallStatus::HungUp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::NotStarted => "not_started",
            CallStatus::InProgress => "in_progress",
            CallStatus::PickedUp => "picked_up",
            CallStatus::ConversationEnded => "conversation_ended",
            CallStatus::HungUp => "hung_up",
            CallStatus::Rescheduled => "rescheduled",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal driving a call transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    /// The call service accepted a call-initiation request.
    Initiated,
    PickedUp,
    Completed {
        summary: String,
        screening_score: u8,
    },
    Disconnected,
    Rescheduled {
        date: DateTime<Utc>,
    },
}

impl CallEvent {
    pub fn target(&self) -> CallStatus {
        match self {
            CallEvent::Initiated => CallStatus::InProgress,
            CallEvent::PickedUp => CallStatus::PickedUp,
            CallEvent::Completed { .. } => CallStatus::ConversationEnded,
            CallEvent::Disconnected => CallStatus::HungUp,
            CallEvent::Rescheduled { .. } => CallStatus::Rescheduled,
        }
    }

    /// Builds the event carried by an external status report.
    ///
    /// `in_progress` and `not_started` are never reportable: the only way into
    /// `in_progress` is a successful initiation request.
    pub fn from_report(
        status: CallStatus,
        summary: Option<String>,
        score: Option<i64>,
        reschedule_date: Option<DateTime<Utc>>,
    ) -> Result<Self, TransitionError> {
        match status {
            CallStatus::NotStarted | CallStatus::InProgress => {
                Err(TransitionError::NotReportable(status))
            }
            CallStatus::PickedUp => Ok(CallEvent::PickedUp),
            CallStatus::HungUp => Ok(CallEvent::Disconnected),
            CallStatus::ConversationEnded => {
                let summary = summary
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(TransitionError::MissingRequiredField("summary"))?;
                let score = score.ok_or(TransitionError::MissingRequiredField("score"))?;
                let screening_score = u8::try_from(score)
                    .ok()
                    .filter(|s| *s <= 100)
                    .ok_or(TransitionError::ScoreOutOfRange(score))?;
                Ok(CallEvent::Completed {
                    summary,
                    screening_score,
                })
            }
            CallStatus::Rescheduled => {
                let date =
                    reschedule_date.ok_or(TransitionError::MissingRequiredField("rescheduleDate"))?;
                Ok(CallEvent::Rescheduled { date })
            }
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Invalid call transition: {from} -> {to}")]
    InvalidTransition { from: CallStatus, to: CallStatus },

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Screening score {0} is outside 0-100")]
    ScoreOutOfRange(i64),

    #[error("Call status '{0}' cannot be reported externally")]
    NotReportable(CallStatus),
}

/// A candidate the recruiter shortlisted, with call-tracking fields.
///
/// Call fields are only reachable through `apply`, which keeps them consistent
/// with `call_status`: summary and score are set together and only in
/// `conversation_ended`; the reschedule date only in `rescheduled`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistedCandidate {
    #[serde(flatten)]
    pub candidate: CandidateRecord,
    call_status: CallStatus,
    call_summary: Option<String>,
    screening_score: Option<u8>,
    reschedule_date: Option<DateTime<Utc>>,
}

impl ShortlistedCandidate {
    pub fn new(candidate: CandidateRecord) -> Self {
        Self {
            candidate,
            call_status: CallStatus::NotStarted,
            call_summary: None,
            screening_score: None,
            reschedule_date: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    pub fn call_status(&self) -> CallStatus {
        self.call_status
    }

    #[cfg(test)]
    pub fn call_summary(&self) -> Option<&str> {
        self.call_summary.as_deref()
    }

    #[cfg(test)]
    pub fn screening_score(&self) -> Option<u8> {
        self.screening_score
    }

    #[cfg(test)]
    pub fn reschedule_date(&self) -> Option<DateTime<Utc>> {
        self.reschedule_date
    }

    /// Validates `event` against the current status without mutating.
    pub fn check(&self, event: &CallEvent) -> Result<(), TransitionError> {
        use CallStatus::*;

        let from = self.call_status;
        let allowed = match event {
            CallEvent::Initiated => from == NotStarted,
            CallEvent::PickedUp => from == InProgress,
            CallEvent::Completed { .. } => from == PickedUp,
            CallEvent::Disconnected => matches!(from, InProgress | PickedUp),
            CallEvent::Rescheduled { .. } => from != NotStarted && !from.is_terminal(),
        };

        if !allowed {
            return Err(TransitionError::InvalidTransition {
                from,
                to: event.target(),
            });
        }

        if let CallEvent::Completed {
            summary,
            screening_score,
        } = event
        {
            if summary.trim().is_empty() {
                return Err(TransitionError::MissingRequiredField("summary"));
            }
            if *screening_score > 100 {
                return Err(TransitionError::ScoreOutOfRange(i64::from(*screening_score)));
            }
        }

        Ok(())
    }

    /// Applies `event`, returning the previous status.
    pub fn apply(&mut self, event: CallEvent) -> Result<CallStatus, TransitionError> {
        self.check(&event)?;

        let from = self.call_status;
        self.call_status = event.target();

        match event {
            CallEvent::Completed {
                summary,
                screening_score,
            } => {
                self.call_summary = Some(summary);
                self.screening_score = Some(screening_score);
                self.reschedule_date = None;
            }
            CallEvent::Rescheduled { date } => {
                self.reschedule_date = Some(date);
            }
            CallEvent::Initiated | CallEvent::PickedUp | CallEvent::Disconnected => {
                self.reschedule_date = None;
            }
        }

        Ok(from)
    }
}

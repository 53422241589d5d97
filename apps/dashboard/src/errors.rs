use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::calls::state_machine::{CallStatus, TransitionError};
use crate::candidates::normalizer::NormalizeError;
use crate::gateway::GatewayError;
use crate::outreach::status::OutreachError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Call already initiated for candidate {candidate_id} (status: {status})")]
    CallAlreadyInitiated {
        candidate_id: String,
        status: CallStatus,
    },

    #[error("Another update for candidate {candidate_id}'s call is still in flight")]
    CallUpdateInFlight { candidate_id: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Outreach(#[from] OutreachError),
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::MalformedResponse(msg) => AppError::MalformedResponse(msg),
        }
    }
}

impl AppError {
    /// Whether the recruiter should be offered a retry of the triggering action.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Gateway(e) => e.is_retryable(),
            AppError::CallUpdateInFlight { .. } => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::CallAlreadyInitiated { .. } => {
                (StatusCode::CONFLICT, "CALL_ALREADY_INITIATED", self.to_string())
            }
            AppError::CallUpdateInFlight { .. } => {
                (StatusCode::CONFLICT, "CALL_UPDATE_IN_FLIGHT", self.to_string())
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed search response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    "The search service returned an unexpected response".to_string(),
                )
            }
            AppError::Gateway(e) => {
                tracing::error!("Gateway error: {e}");
                match e {
                    GatewayError::Transport(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "TRANSPORT_ERROR",
                        "Could not reach an external service".to_string(),
                    ),
                    GatewayError::BadRequest { message, .. } => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_BAD_REQUEST",
                        format!("The request was rejected: {message}"),
                    ),
                    GatewayError::Service { .. } => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_SERVICE_ERROR",
                        "An external service failed".to_string(),
                    ),
                }
            }
            AppError::Transition(e) => {
                tracing::warn!("Rejected call transition: {e}");
                match e {
                    TransitionError::InvalidTransition { .. } | TransitionError::NotReportable(_) => {
                        (StatusCode::CONFLICT, "INVALID_TRANSITION", e.to_string())
                    }
                    TransitionError::MissingRequiredField(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "MISSING_REQUIRED_FIELD",
                        e.to_string(),
                    ),
                    TransitionError::ScoreOutOfRange(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "VALIDATION_ERROR",
                        e.to_string(),
                    ),
                }
            }
            AppError::Outreach(e) => {
                tracing::warn!("Rejected outreach update: {e}");
                (StatusCode::CONFLICT, "INVALID_TRANSITION", e.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": self.is_retryable()
            }
        }));

        (status, body).into_response()
    }
}

//! API gateway. The single boundary to the two external services the dashboard
//! depends on: semantic search and call initiation.
//!
//! ARCHITECTURAL RULE: No other module talks HTTP to these services.
//! Every failure is one of `GatewayError::{Transport, BadRequest, Service}`.
//! Each request is attempted once; retrying is the recruiter's decision.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calls::prompts::SCREENING_INSTRUCTION;
use crate::calls::state_machine::CallStatus;
use crate::config::Config;

const SEARCH_PATH: &str = "/search";
const CREATE_CALL_PATH: &str = "/create-call";
const CALL_STATUS_PATH: &str = "/call-status";

/// Search payload exactly as the backend returned it. Shape is checked by the normalizer.
pub type RawSearchResponse = Value;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request rejected (status {status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Service error (status {status}): {message}")]
    Service { status: u16, message: String },
}

impl GatewayError {
    /// Whether repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::BadRequest { .. })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    result_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCallRequest<'a> {
    user_phone: &'a str,
    instruction: &'a str,
    applicant_id: &'a str,
}

/// Acknowledgement of an accepted call-initiation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallInitiationResult {
    pub call_id: Option<String>,
    pub raw: Value,
}

/// Call-status report. Same shape inbound (webhook) and outbound (report to the call service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusReport {
    #[serde(alias = "applicant_id", alias = "candidateId", alias = "candidate_id")]
    pub applicant_id: String,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "reschedule_date"
    )]
    pub reschedule_date: Option<DateTime<Utc>>,
}

/// The seam between orchestration and the external services.
/// `AppState` carries an `Arc<dyn Gateway>`; tests swap in a fake.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn search(
        &self,
        query: &str,
        result_limit: u32,
        threshold: Option<f64>,
    ) -> Result<RawSearchResponse, GatewayError>;

    async fn initiate_call(&self, candidate_id: &str)
        -> Result<CallInitiationResult, GatewayError>;

    async fn report_call_status(&self, report: &CallStatusReport) -> Result<(), GatewayError>;
}

/// reqwest-backed gateway to the search and call services.
#[derive(Clone)]
pub struct ApiGatewayClient {
    client: Client,
    search_base_url: String,
    call_base_url: String,
    user_phone: String,
}

impl ApiGatewayClient {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        Self::with_urls(
            &config.search_service_url,
            &config.call_service_url,
            &config.call_user_phone,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_urls(
        search_base_url: &str,
        call_base_url: &str,
        user_phone: &str,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_base_url: search_base_url.trim_end_matches('/').to_string(),
            call_base_url: call_base_url.trim_end_matches('/').to_string(),
            user_phone: user_phone.to_string(),
        })
    }

    /// Single POST with uniform error mapping. An empty success body decodes as `null`.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(url)
            .header("accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("POST {url} failed in transport: {e}");
                GatewayError::Transport(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read body: {e}")))?;

        if status.is_client_error() {
            warn!("POST {url} rejected with {status}: {text}");
            return Err(GatewayError::BadRequest {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        if !status.is_success() {
            warn!("POST {url} returned {status}: {text}");
            return Err(GatewayError::Service {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("POST {url} returned a non-JSON body: {e}");
            GatewayError::Service {
                status: status.as_u16(),
                message: format!("invalid JSON body: {e}"),
            }
        })
    }
}

#[async_trait]
impl Gateway for ApiGatewayClient {
    async fn search(
        &self,
        query: &str,
        result_limit: u32,
        threshold: Option<f64>,
    ) -> Result<RawSearchResponse, GatewayError> {
        let url = format!("{}{SEARCH_PATH}", self.search_base_url);
        debug!("Searching: query='{query}', limit={result_limit}, threshold={threshold:?}");

        let body = SearchRequest {
            query,
            result_limit,
            threshold,
        };
        self.post_json(&url, &body).await
    }

    async fn initiate_call(
        &self,
        candidate_id: &str,
    ) -> Result<CallInitiationResult, GatewayError> {
        let url = format!("{}{CREATE_CALL_PATH}", self.call_base_url);
        let body = CreateCallRequest {
            user_phone: &self.user_phone,
            instruction: SCREENING_INSTRUCTION,
            applicant_id: candidate_id,
        };

        let raw = self.post_json(&url, &body).await?;
        let call_id = extract_call_id(&raw);
        info!("Call initiated for candidate {candidate_id} (call_id={call_id:?})");

        Ok(CallInitiationResult { call_id, raw })
    }

    async fn report_call_status(&self, report: &CallStatusReport) -> Result<(), GatewayError> {
        let url = format!("{}{CALL_STATUS_PATH}", self.call_base_url);
        self.post_json(&url, report).await?;
        debug!(
            "Reported call status {} for candidate {}",
            report.status, report.applicant_id
        );
        Ok(())
    }
}

fn extract_call_id(raw: &Value) -> Option<String> {
    ["callId", "call_id", "id"]
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Pulls a human-readable message out of an error body (`message`, FastAPI `detail`,
/// or `{error: {message}}`), falling back to the raw text.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("detail"))
            .or_else(|| v.get("error").and_then(|e| e.get("message")))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    from_json.unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> ApiGatewayClient {
        ApiGatewayClient::with_urls(base, base, "+15550100", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_camel_case_body() {
        let router = Router::new().route(
            "/search",
            post(|Json(body): Json<Value>| async move { Json(json!({"results": [], "echo": body})) }),
        );
        let base = spawn(router).await;

        let raw = client(&base).search("rust engineer", 10, Some(0.7)).await.unwrap();
        assert_eq!(raw["echo"]["query"], "rust engineer");
        assert_eq!(raw["echo"]["resultLimit"], 10);
        assert_eq!(raw["echo"]["threshold"], 0.7);
    }

    #[tokio::test]
    async fn test_search_omits_absent_threshold() {
        let router = Router::new().route(
            "/search",
            post(|Json(body): Json<Value>| async move { Json(json!({"echo": body})) }),
        );
        let base = spawn(router).await;

        let raw = client(&format!("{base}/")).search("q", 5, None).await.unwrap();
        assert!(raw["echo"].get("threshold").is_none());
    }

    #[tokio::test]
    async fn test_4xx_maps_to_bad_request() {
        let router = Router::new().route(
            "/search",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"detail": "query must not be empty"})),
                )
            }),
        );
        let base = spawn(router).await;

        let err = client(&base).search("", 10, None).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::BadRequest {
                status: 422,
                message: "query must not be empty".to_string()
            }
        );
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_5xx_maps_to_service_error() {
        let router = Router::new().route(
            "/create-call",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
        );
        let base = spawn(router).await;

        let err = client(&base).initiate_call("7").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Service {
                status: 503,
                message: "overloaded".to_string()
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_service_error() {
        let router = Router::new().route("/search", post(|| async { "<html>ok</html>" }));
        let base = spawn(router).await;

        let err = client(&base).search("q", 1, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Service { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .search("q", 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let router = Router::new().route(
            "/search",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"results": []}))
            }),
        );
        let base = spawn(router).await;
        let client =
            ApiGatewayClient::with_urls(&base, &base, "+15550100", Duration::from_millis(100))
                .unwrap();

        let err = client.search("q", 1, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_initiate_call_sends_phone_and_instruction() {
        let router = Router::new().route(
            "/create-call",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["userPhone"], "+15550100");
                assert_eq!(body["applicantId"], "7");
                assert!(body["instruction"]
                    .as_str()
                    .unwrap()
                    .contains("pre-screening call"));
                Json(json!({"callId": "call-123", "status": "queued"}))
            }),
        );
        let base = spawn(router).await;

        let result = client(&base).initiate_call("7").await.unwrap();
        assert_eq!(result.call_id.as_deref(), Some("call-123"));
        assert_eq!(result.raw["status"], "queued");
    }

    #[tokio::test]
    async fn test_report_call_status_accepts_empty_ack() {
        let router = Router::new().route(
            "/call-status",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["applicantId"], "7");
                assert_eq!(body["status"], "conversation_ended");
                assert_eq!(body["score"], 82);
                assert!(body.get("rescheduleDate").is_none());
                StatusCode::NO_CONTENT
            }),
        );
        let base = spawn(router).await;

        let report = CallStatusReport {
            applicant_id: "7".to_string(),
            status: CallStatus::ConversationEnded,
            summary: Some("Great fit".to_string()),
            score: Some(82),
            reschedule_date: None,
        };
        client(&base).report_call_status(&report).await.unwrap();
    }

    #[test]
    fn test_call_status_report_accepts_snake_case_id() {
        let report: CallStatusReport =
            serde_json::from_str(r#"{"applicant_id": "9", "status": "picked_up"}"#).unwrap();
        assert_eq!(report.applicant_id, "9");
        assert_eq!(report.status, CallStatus::PickedUp);
        assert_eq!(report.summary, None);
    }

    #[test]
    fn test_extract_call_id_variants() {
        assert_eq!(extract_call_id(&json!({"call_id": 55})), Some("55".to_string()));
        assert_eq!(extract_call_id(&json!({"id": "x"})), Some("x".to_string()));
        assert_eq!(extract_call_id(&Value::Null), None);
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(r#"{"message": "nope"}"#), "nope");
        assert_eq!(error_message(r#"{"error": {"message": "bad"}}"#), "bad");
        assert_eq!(error_message("plain text "), "plain text");
    }
}

//! HTTP client for the TrackDrive lead API.
//!
//! Handles request construction, response parsing, and error
//! categorization so the pipeline can distinguish an upstream rejection
//! (status propagated to the caller) from an unreachable upstream.

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info_span, warn, Instrument};

use crate::error::{DeliveryError, Result};

/// Configuration for the TrackDrive client.
#[derive(Debug, Clone)]
pub struct TrackdriveConfig {
    /// Lead submission endpoint.
    pub api_url: String,
    /// Bearer credential for the `Authorization` header.
    pub api_key: String,
    /// Fixed client identifier sent as the `User-Agent` header.
    pub user_agent: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for TrackdriveConfig {
    fn default() -> Self {
        Self {
            api_url: "https://ramonmarquez.trackdrive.com/api/v1/leads".to_string(),
            api_key: String::new(),
            user_agent: "Leadgate-Webhook/1.0".to_string(),
            timeout: Duration::from_secs(crate::DEFAULT_UPSTREAM_TIMEOUT_SECONDS),
        }
    }
}

/// Response from a successful lead submission (any 2xx status).
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body; a bare JSON string when the body was not JSON.
    pub body: Value,
}

impl UpstreamResponse {
    /// The lead identifier assigned upstream, preferring `lead_id` over
    /// `id`. `None` when the body carries neither.
    pub fn lead_id(&self) -> Option<&Value> {
        self.body
            .get("lead_id")
            .filter(|v| !v.is_null())
            .or_else(|| self.body.get("id").filter(|v| !v.is_null()))
    }
}

/// Client for submitting leads to TrackDrive.
#[derive(Debug, Clone)]
pub struct TrackdriveClient {
    client: reqwest::Client,
    config: TrackdriveConfig,
}

impl TrackdriveClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Configuration` if the HTTP client cannot
    /// be built with the provided settings.
    pub fn new(config: TrackdriveConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Submits a lead record, awaiting the upstream verdict.
    ///
    /// # Errors
    ///
    /// - `UpstreamHttp` for any non-2xx response, carrying status, reason
    ///   phrase, and the raw body.
    /// - `UpstreamUnreachable` when no response arrives (connect failure
    ///   or the configured timeout elapsing).
    pub async fn submit_lead(&self, record: &Map<String, Value>) -> Result<UpstreamResponse> {
        let span = info_span!("trackdrive_submit", url = %self.config.api_url);

        async move {
            debug!(fields = record.len(), "Submitting lead to TrackDrive");

            let response = self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.config.api_key)
                .json(record)
                .send()
                .await
                .map_err(categorize_transport_error)?;

            let status = response.status();
            let body_text = response
                .text()
                .await
                .map_err(|e| DeliveryError::unreachable(format!("failed to read response: {e}")))?;

            if !status.is_success() {
                warn!(status = status.as_u16(), "TrackDrive rejected the lead");
                return Err(DeliveryError::upstream_http(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    body_text,
                ));
            }

            debug!(status = status.as_u16(), "TrackDrive accepted the lead");

            let body = serde_json::from_str(&body_text).unwrap_or(Value::String(body_text));
            Ok(UpstreamResponse { status: status.as_u16(), body })
        }
        .instrument(span)
        .await
    }
}

fn categorize_transport_error(e: reqwest::Error) -> DeliveryError {
    if e.is_timeout() {
        DeliveryError::unreachable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        DeliveryError::unreachable(format!("connection failed: {e}"))
    } else {
        DeliveryError::unreachable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client(api_url: String) -> TrackdriveClient {
        TrackdriveClient::new(TrackdriveConfig {
            api_url,
            api_key: "secret-key".to_string(),
            ..TrackdriveConfig::default()
        })
        .unwrap()
    }

    fn lead_record() -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("first_name".to_string(), json!("Jane"));
        record
    }

    #[tokio::test]
    async fn successful_submission_parses_body() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/api/v1/leads"))
            .and(matchers::header("authorization", "Bearer secret-key"))
            .and(matchers::header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
            .mount(&server)
            .await;

        let client = test_client(format!("{}/api/v1/leads", server.uri()));
        let response = client.submit_lead(&lead_record()).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({"id": 42}));
    }

    #[tokio::test]
    async fn rejection_surfaces_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"errors": ["invalid email"]})),
            )
            .mount(&server)
            .await;

        let client = test_client(format!("{}/api/v1/leads", server.uri()));
        let error = client.submit_lead(&lead_record()).await.unwrap_err();

        match error {
            DeliveryError::UpstreamHttp { status, status_text, body } => {
                assert_eq!(status, 422);
                assert_eq!(status_text, "Unprocessable Entity");
                assert_eq!(
                    serde_json::from_str::<Value>(&body).unwrap(),
                    json!({"errors": ["invalid email"]})
                );
            },
            other => panic!("expected UpstreamHttp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_is_unreachable() {
        // Nothing listens on port 1.
        let client = test_client("http://127.0.0.1:1/api/v1/leads".to_string());
        let error = client.submit_lead(&lead_record()).await.unwrap_err();

        assert!(matches!(error, DeliveryError::UpstreamUnreachable { .. }));
    }

    #[tokio::test]
    async fn non_json_success_body_kept_as_string() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let response = client.submit_lead(&lead_record()).await.unwrap();

        assert_eq!(response.body, json!("accepted"));
    }

    #[test]
    fn lead_id_prefers_lead_id_over_id() {
        let response = UpstreamResponse { status: 200, body: json!({"lead_id": 7, "id": 42}) };
        assert_eq!(response.lead_id(), Some(&json!(7)));

        let response = UpstreamResponse { status: 200, body: json!({"id": 42}) };
        assert_eq!(response.lead_id(), Some(&json!(42)));

        let response = UpstreamResponse { status: 200, body: json!({"ok": true}) };
        assert_eq!(response.lead_id(), None);
    }
}

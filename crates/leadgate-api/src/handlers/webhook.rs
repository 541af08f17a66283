//! Lead submission handlers: the live relay and its dry-run twin.
//!
//! Both parse whatever body arrives (JSON object or urlencoded form)
//! into the unschema'd inbound mapping; anything unparseable degrades to
//! an empty mapping rather than a client error, since the relay makes no
//! promises about payload shape.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use leadgate_core::InboundPayload;
use leadgate_delivery::{DeliveryError, RelayOutcome};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::AppState;

/// Infallible extractor for the transport-level peer address.
///
/// `None` when the server was started without connect-info propagation,
/// as in-process test routers are.
#[derive(Debug, Clone, Copy)]
pub struct PeerAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for PeerAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|info| info.0)))
    }
}

/// Relays one lead submission to the lead API and the spreadsheet.
///
/// Success returns the upstream response alongside the extracted lead
/// identifier; failures collapse into the unified error envelope with
/// the upstream status propagated when there is one.
#[instrument(name = "relay_webhook", skip_all)]
pub async fn relay_webhook(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = parse_payload(&headers, &body);
    let client_addr = resolve_client_addr(peer, &headers);

    info!(fields = payload.len(), "Processing lead submission");

    match state.pipeline.relay(&payload, &client_addr).await {
        RelayOutcome::Delivered { upstream } => {
            let lead_id = upstream.lead_id().cloned().unwrap_or(Value::Null);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "trackdrive_response": upstream.body,
                    "lead_id": lead_id,
                    "sheets_status": "Row appended successfully",
                })),
            )
                .into_response()
        },
        RelayOutcome::Rejected { error } => failure_response(&error),
        RelayOutcome::PartiallyDelivered { sheets_error, .. } => failure_response(&sheets_error),
    }
}

/// Dry-run inspection endpoint: builds every derived shape without
/// performing outbound calls, and echoes the request metadata.
#[instrument(name = "inspect_webhook", skip_all)]
pub async fn inspect_webhook(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = parse_payload(&headers, &body);
    let client_addr = resolve_client_addr(peer, &headers);

    debug!(fields = payload.len(), "Inspecting lead submission");

    let (clean, record) = state.pipeline.preview(&payload, &client_addr);
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok()).unwrap_or("");

    Json(json!({
        "original_payload": payload,
        "cleaned_payload": clean,
        "trackdrive_payload": record,
        "headers": extract_headers(&headers),
        "ip": client_addr,
        "referer": referer,
    }))
    .into_response()
}

/// Maps a delivery failure onto the unified error envelope.
///
/// The envelope always carries all four keys; the side that did not fail
/// is explicitly null.
fn failure_response(error: &DeliveryError) -> Response {
    let (status, trackdrive_error, sheets_error) = match error {
        DeliveryError::UpstreamHttp { status, body, .. } => {
            let status =
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone()));
            (status, body, Value::Null)
        },
        DeliveryError::UpstreamUnreachable { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Value::String("Network error".to_string()),
            Value::Null,
        ),
        other => {
            (StatusCode::INTERNAL_SERVER_ERROR, Value::Null, Value::String(other.to_string()))
        },
    };

    (
        status,
        Json(json!({
            "success": false,
            "error": error.to_string(),
            "trackdrive_error": trackdrive_error,
            "sheets_error": sheets_error,
        })),
    )
        .into_response()
}

/// Parses the request body into the inbound mapping.
fn parse_payload(headers: &HeaderMap, body: &Bytes) -> InboundPayload {
    let content_type =
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map(|pairs| pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
            .unwrap_or_default();
    }

    serde_json::from_slice(body).unwrap_or_default()
}

/// Resolves the caller's network address: the peer address when the
/// transport reports one, then the first `x-forwarded-for` hop, then
/// the empty string.
fn resolve_client_addr(peer: Option<SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Extracts headers into a plain map for the echo endpoint.
fn extract_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (name, value) in headers {
        if let Ok(value_str) = value.to_str() {
            map.insert(name.as_str().to_string(), value_str.to_string());
        }
    }
    map
}

//! Inbound payload sanitizing.

use serde_json::{Map, Value};

use crate::fields::{ARTIFACT_PREFIX, CERT_URL_KEY};

/// Raw form submission: an unordered string-keyed mapping of scalar values.
/// No schema is enforced; any key set is accepted.
pub type InboundPayload = Map<String, Value>;

/// Strips verification-artifact fields from a raw submission.
///
/// Every key starting with the artifact prefix is dropped except the
/// certificate URL, which downstream sinks keep. All other keys pass
/// through unchanged.
pub fn sanitize(payload: &InboundPayload) -> InboundPayload {
    payload
        .iter()
        .filter(|(key, _)| !key.starts_with(ARTIFACT_PREFIX) || key.as_str() == CERT_URL_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

//! Spreadsheet row construction.

use serde_json::Value;

use crate::fields::{cell_value, consent_label, is_empty, Fallback, Seeds, CERT_URL_KEY, FIELD_SPECS};
use crate::payload::InboundPayload;

/// Projects a sanitized payload onto the fixed 14-cell spreadsheet row.
///
/// Unlike the API record, missing values are rendered as empty cells so
/// the row always matches the header schema in length and order. Each
/// column applies its own fallback before rendering; the consent column
/// is coerced to Yes/No whenever a value is present.
pub fn build_sheet_row(clean: &InboundPayload, seeds: &Seeds<'_>) -> Vec<String> {
    FIELD_SPECS
        .iter()
        .map(|spec| {
            let supplied = clean.get(spec.column).filter(|v| !is_empty(v)).cloned();
            let value = supplied.or_else(|| fallback_value(spec.fallback, clean, seeds));

            match value {
                Some(v) if spec.consent => consent_label(&v).to_string(),
                Some(v) => cell_value(&v),
                None => String::new(),
            }
        })
        .collect()
}

fn fallback_value(
    fallback: Fallback,
    clean: &InboundPayload,
    seeds: &Seeds<'_>,
) -> Option<Value> {
    match fallback {
        Fallback::None => None,
        Fallback::CertUrl => clean.get(CERT_URL_KEY).cloned(),
        Fallback::LeadToken => Some(Value::String(seeds.lead_token.to_string())),
        Fallback::ClientAddr => Some(Value::String(seeds.client_addr.to_string())),
        Fallback::OriginUrl => Some(Value::String(seeds.origin_url.to_string())),
    }
}

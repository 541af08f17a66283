//! Lead field schema shared by both outbound projections.
//!
//! One table describes every spreadsheet column: whether it is the consent
//! field, which fallback supplies it when the payload lacks it, and whether
//! it is also forwarded to the TrackDrive API. The record builder and the
//! row builder both iterate this table, so renaming a field or changing a
//! coercion happens in exactly one place.

use serde_json::Value;

/// Prefix marking fields injected by the consent-verification widget.
///
/// Everything with this prefix is dropped during sanitizing except the
/// certificate URL itself.
pub const ARTIFACT_PREFIX: &str = "xxTrustedForm";

/// The one verification-artifact field retained downstream: the signed
/// certificate URL.
pub const CERT_URL_KEY: &str = "xxTrustedFormCertUrl";

/// Fallback source for a column when the payload does not supply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// No fallback; the value is absent when the payload omits it.
    None,
    /// The retained certificate-URL key of the sanitized payload.
    CertUrl,
    /// The configured lead token constant.
    LeadToken,
    /// The client address resolved from the inbound connection.
    ClientAddr,
    /// The configured origin URL constant.
    OriginUrl,
}

/// Schema entry for one spreadsheet column.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Column name; doubles as the lookup key in the sanitized payload.
    pub column: &'static str,
    /// Whether this is the TCPA consent field (rendered Yes/No).
    pub consent: bool,
    /// Value source when the payload lacks the field.
    pub fallback: Fallback,
    /// Whether the field is also part of the TrackDrive API record.
    pub api_mapped: bool,
}

const fn text(column: &'static str) -> FieldSpec {
    FieldSpec { column, consent: false, fallback: Fallback::None, api_mapped: true }
}

const fn with_fallback(column: &'static str, fallback: Fallback) -> FieldSpec {
    FieldSpec { column, consent: false, fallback, api_mapped: true }
}

/// The 14-column lead schema, in spreadsheet order.
pub const FIELD_SPECS: [FieldSpec; 14] = [
    text("first_name"),
    text("last_name"),
    text("caller_id"),
    text("email"),
    text("address"),
    text("city"),
    text("state"),
    text("zip"),
    text("accident_date"),
    with_fallback("ip_address", Fallback::ClientAddr),
    with_fallback("source_url", Fallback::OriginUrl),
    with_fallback("trusted_form_cert_url", Fallback::CertUrl),
    FieldSpec { column: "tcpa_opt_in", consent: true, fallback: Fallback::None, api_mapped: true },
    FieldSpec {
        column: "lead_token",
        consent: false,
        fallback: Fallback::LeadToken,
        api_mapped: false,
    },
];

/// Returns the spreadsheet header row, in column order.
pub fn sheet_columns() -> Vec<&'static str> {
    FIELD_SPECS.iter().map(|s| s.column).collect()
}

/// Constants seeded into every projection, resolved per request.
#[derive(Debug, Clone, Copy)]
pub struct Seeds<'a> {
    /// Authentication token identifying this publisher to the lead API.
    pub lead_token: &'a str,
    /// Origin URL reported as the lead source.
    pub origin_url: &'a str,
    /// Client network address, empty when unresolvable.
    pub client_addr: &'a str,
}

/// Renders the consent field: `"1"`, `true` and `"true"` mean opted in.
pub fn consent_label(value: &Value) -> &'static str {
    let opted_in = matches!(value, Value::Bool(true))
        || matches!(value, Value::String(s) if s == "1" || s == "true");
    if opted_in {
        "Yes"
    } else {
        "No"
    }
}

/// Stringifies a present scalar value for the API record.
pub fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Renders a spreadsheet cell: booleans become Yes/No, null becomes the
/// empty string, everything else stringifies.
pub fn cell_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Null => String::new(),
        other => text_value(other),
    }
}

/// Whether a value counts as absent for the API record (null or empty
/// string; an absent key is handled by the caller).
pub fn is_empty(value: &Value) -> bool {
    matches!(value, Value::Null) || matches!(value, Value::String(s) if s.is_empty())
}

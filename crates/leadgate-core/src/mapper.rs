//! TrackDrive API record construction.

use serde_json::{Map, Value};

use crate::fields::{consent_label, is_empty, text_value, Seeds, CERT_URL_KEY, FIELD_SPECS};
use crate::payload::InboundPayload;

/// Projects a sanitized payload onto the TrackDrive lead record.
///
/// The record never carries a null or empty value: fields the payload
/// lacks are omitted rather than written empty. Server-resolved values
/// take precedence over client-supplied ones for `source_url` (always the
/// configured origin) and `ip_address` (the resolved client address wins
/// whenever it is non-empty). The certificate URL is assigned last and
/// overrides a `trusted_form_cert_url` field set by the mapping loop.
pub fn build_api_record(clean: &InboundPayload, seeds: &Seeds<'_>) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("lead_token".to_string(), Value::String(seeds.lead_token.to_string()));

    for spec in FIELD_SPECS.iter().filter(|s| s.api_mapped) {
        let Some(value) = clean.get(spec.column) else { continue };
        if is_empty(value) {
            continue;
        }
        let rendered = if spec.consent {
            consent_label(value).to_string()
        } else {
            text_value(value)
        };
        record.insert(spec.column.to_string(), Value::String(rendered));
    }

    record.insert("source_url".to_string(), Value::String(seeds.origin_url.to_string()));
    if !seeds.client_addr.is_empty() {
        record.insert("ip_address".to_string(), Value::String(seeds.client_addr.to_string()));
    }

    if let Some(cert_url) = clean.get(CERT_URL_KEY).filter(|v| !is_empty(v)) {
        record
            .insert("trusted_form_cert_url".to_string(), Value::String(text_value(cert_url)));
    }

    record
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SEEDS: Seeds<'static> = Seeds {
        lead_token: "token-123",
        origin_url: "https://forms.example.com/",
        client_addr: "203.0.113.9",
    };

    fn clean(value: serde_json::Value) -> InboundPayload {
        value.as_object().expect("test payload must be an object").clone()
    }

    #[test]
    fn seeds_always_present() {
        let record = build_api_record(&InboundPayload::new(), &SEEDS);

        assert_eq!(record["lead_token"], json!("token-123"));
        assert_eq!(record["source_url"], json!("https://forms.example.com/"));
        assert_eq!(record["ip_address"], json!("203.0.113.9"));
    }

    #[test]
    fn empty_and_null_fields_omitted() {
        let record = build_api_record(
            &clean(json!({"first_name": "", "last_name": null, "email": "j@d.com"})),
            &SEEDS,
        );

        assert!(!record.contains_key("first_name"));
        assert!(!record.contains_key("last_name"));
        assert_eq!(record["email"], json!("j@d.com"));
    }

    #[test]
    fn no_value_is_ever_empty() {
        let record = build_api_record(
            &clean(json!({"city": "", "zip": "90210", "state": null})),
            &Seeds { client_addr: "", ..SEEDS },
        );

        assert!(!record.contains_key("ip_address"));
        assert!(record.values().all(|v| v.as_str().is_some_and(|s| !s.is_empty())));
    }

    #[test]
    fn consent_field_coerced() {
        for (given, expected) in
            [(json!("1"), "Yes"), (json!(true), "Yes"), (json!("true"), "Yes"), (json!("0"), "No")]
        {
            let record = build_api_record(&clean(json!({"tcpa_opt_in": given})), &SEEDS);
            assert_eq!(record["tcpa_opt_in"], json!(expected));
        }

        let record = build_api_record(&clean(json!({"tcpa_opt_in": ""})), &SEEDS);
        assert!(!record.contains_key("tcpa_opt_in"));
    }

    #[test]
    fn other_scalars_stringified() {
        let record = build_api_record(&clean(json!({"zip": 90210, "caller_id": false})), &SEEDS);

        assert_eq!(record["zip"], json!("90210"));
        assert_eq!(record["caller_id"], json!("false"));
    }

    #[test]
    fn cert_url_overrides_mapped_field() {
        let record = build_api_record(
            &clean(json!({
                "trusted_form_cert_url": "https://cert.example/mapped",
                "xxTrustedFormCertUrl": "https://cert.example/signed",
            })),
            &SEEDS,
        );

        assert_eq!(record["trusted_form_cert_url"], json!("https://cert.example/signed"));
    }

    #[test]
    fn server_resolved_values_win() {
        let record = build_api_record(
            &clean(json!({"ip_address": "10.0.0.1", "source_url": "https://spoof.example/"})),
            &SEEDS,
        );

        assert_eq!(record["ip_address"], json!("203.0.113.9"));
        assert_eq!(record["source_url"], json!("https://forms.example.com/"));
    }

    #[test]
    fn client_supplied_address_survives_when_unresolved() {
        let record = build_api_record(
            &clean(json!({"ip_address": "10.0.0.1"})),
            &Seeds { client_addr: "", ..SEEDS },
        );

        assert_eq!(record["ip_address"], json!("10.0.0.1"));
    }
}

use chrono::{TimeZone, Utc};
use strata_core::{Envelope, EnvelopeError, Value};

mod common;

#[test]
fn test_envelope_json_shape() {
    let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    let envelope = Envelope::packed_at(Value::from(vec!["alice", "bob"]), at);

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "doc": ["alice", "bob"],
            "meta": {"updateTime": "2024-03-09 14:05:07"}
        })
    );
}

#[test]
fn test_envelope_read_from_stored_json() {
    let stored = common::value_from_json(
        r#"{"doc": {"total": 2}, "meta": {"updateTime": "2024-03-09 14:05:07"}}"#,
    );

    let (meta, payload) = Envelope::unpack(stored).unwrap();
    assert_eq!(payload, common::value_from_json(r#"{"total": 2}"#));
    assert_eq!(
        meta.updated_at(),
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    );
}

#[test]
fn test_stored_value_matches_serde_form() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let envelope = Envelope::packed_at(Value::from(42), at);

    let via_serde: Value = serde_json::from_value(serde_json::to_value(&envelope).unwrap()).unwrap();
    assert_eq!(via_serde, envelope.into_value());
}

#[test]
fn test_foreign_documents_rejected() {
    for json in [
        r#""plain string""#,
        r#"{"doc": 1}"#,
        r#"{"meta": {"updateTime": "2024-01-01 00:00:00"}}"#,
        r#"{"doc": 1, "meta": {"updateTime": "yesterday"}}"#,
    ] {
        let result = Envelope::unpack(common::value_from_json(json));
        assert!(
            matches!(result, Err(EnvelopeError::Malformed(_))),
            "expected malformed for {json}"
        );
    }
}

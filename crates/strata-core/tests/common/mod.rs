#![allow(dead_code)]
use strata_core::Value;

/// Builds a Value from a JSON string slice.
/// Panics if the JSON is invalid (intended for tests).
pub fn value_from_json(json: &str) -> Value {
    serde_json::from_str(json).expect("Failed to create test value from JSON")
}

/// Arguments shaped like a paginated listing request.
pub fn listing_args() -> Vec<Value> {
    vec![
        value_from_json(r#"{"page": 2, "filters": {"role": "admin", "active": true}}"#),
        Value::from("name"),
    ]
}

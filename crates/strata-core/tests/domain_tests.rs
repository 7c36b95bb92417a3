use std::time::Duration;

use strata_core::{
    AccessControls, BypassParams, CacheKey, Diagnostics, ErrorCode, KeyError, ModelName,
    OperationConfig, Value,
};

mod common;

#[test]
fn test_listing_key() {
    let key = CacheKey::derive("users", "listUsers", &common::listing_args()).unwrap();
    assert_eq!(
        key.as_str(),
        "users-listUsers-page#2filters#role#adminactive#1-name"
    );
    assert!(!key.is_hashed());
}

#[test]
fn test_key_follows_resolved_model() {
    let operations = OperationConfig::new().with_model("listUsers", "users");
    let current = ModelName::default();

    let mapped = operations.resolve_model_name("listUsers", &current);
    let unmapped = operations.resolve_model_name("getUser", &current);

    let a = CacheKey::derive(mapped.as_str(), "listUsers", &[]).unwrap();
    let b = CacheKey::derive(unmapped.as_str(), "getUser", &[]).unwrap();
    assert_eq!(a.as_str(), "users-listUsers");
    assert_eq!(b.as_str(), "default-getUser");
}

#[test]
fn test_unusable_key_is_reported() {
    let result = CacheKey::derive("", "", &[Value::from("!!!")]);
    assert_eq!(result, Err(KeyError::Empty));
}

#[test]
fn test_request_params_to_controls() {
    let params: BypassParams =
        serde_json::from_str(r#"{"disable": "storage", "clear": "cache"}"#).unwrap();
    let controls = AccessControls::from(params);

    assert!(controls.storage_disabled);
    assert!(!controls.cache_disabled);
    assert!(!controls.reads_cache());
    assert!(!controls.reads_storage());
}

#[test]
fn test_lifetime_overrides() {
    let mut operations = OperationConfig::new().with_default_lifetime(Duration::from_secs(60));
    operations
        .set_cache_lifetime("listUsers", Duration::ZERO)
        .unwrap();

    assert_eq!(operations.cache_lifetime("listUsers"), Duration::ZERO);
    assert_eq!(operations.cache_lifetime("getUser"), Duration::from_secs(60));
}

#[test]
fn test_trace_workflow() {
    let mut trace = Diagnostics::new();
    trace.record("generate key: default-listUsers");
    trace.set_error(ErrorCode::OriginFailure, "timeout");

    assert_eq!(trace.entries().len(), 2);
    let last = trace.last_error().unwrap();
    assert_eq!(last.code, ErrorCode::OriginFailure);
    assert_eq!(last.message, "timeout");
}

//! Envelope wrapping stored results with update metadata.
//!
//! The stored form is the object `{"doc": <payload>, "meta": {"updateTime":
//! "YYYY-MM-DD HH:MM:SS"}}`, shared by the cache and storage tiers.

use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;
use crate::value::Value;

const PAYLOAD_FIELD: &str = "doc";
const META_FIELD: &str = "meta";
const UPDATED_AT_FIELD: &str = "updateTime";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata stored next to a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "updateTime", with = "timestamp")]
    updated_at: DateTime<Utc>,
}

impl Meta {
    /// Creates metadata stamped at the given instant (second precision).
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at: updated_at.trunc_subsecs(0),
        }
    }

    /// When the payload was computed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn to_value(self) -> Value {
        let mut map = IndexMap::with_capacity(1);
        map.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(self.updated_at.format(TIMESTAMP_FORMAT).to_string()),
        );
        Value::Object(map)
    }

    fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let mut map = value
            .into_object()
            .ok_or_else(|| EnvelopeError::malformed("meta is not an object"))?;
        let raw = match map.swap_remove(UPDATED_AT_FIELD) {
            Some(Value::String(s)) => s,
            _ => return Err(EnvelopeError::malformed("meta.updateTime missing")),
        };
        let updated_at = timestamp::parse(&raw)
            .map_err(|e| EnvelopeError::malformed(format!("meta.updateTime '{raw}': {e}")))?;
        Ok(Self { updated_at })
    }
}

/// A computed result plus its metadata, immutable once created.
///
/// # Example
///
/// ```
/// use strata_core::{Envelope, Value};
///
/// let envelope = Envelope::pack(Value::from(vec!["alice", "bob"]));
/// let (_meta, payload) = Envelope::unpack(envelope.into_value()).unwrap();
/// assert_eq!(payload, Value::from(vec!["alice", "bob"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "doc")]
    payload: Value,
    meta: Meta,
}

impl Envelope {
    /// Wraps a result, stamped with the current time.
    pub fn pack(payload: Value) -> Self {
        Self::packed_at(payload, Utc::now())
    }

    /// Wraps a result with an explicit timestamp.
    pub fn packed_at(payload: Value, updated_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            meta: Meta::new(updated_at),
        }
    }

    /// Splits a stored value back into metadata and payload.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] when `stored` lacks the envelope
    /// shape.
    pub fn unpack(stored: Value) -> Result<(Meta, Value), EnvelopeError> {
        let envelope = Self::from_value(stored)?;
        Ok((envelope.meta, envelope.payload))
    }

    /// Parses the stored form.
    pub fn from_value(stored: Value) -> Result<Self, EnvelopeError> {
        let mut map = stored
            .into_object()
            .ok_or_else(|| EnvelopeError::malformed("stored value is not an object"))?;
        let payload = map
            .swap_remove(PAYLOAD_FIELD)
            .ok_or_else(|| EnvelopeError::malformed("missing doc"))?;
        let meta = map
            .swap_remove(META_FIELD)
            .ok_or_else(|| EnvelopeError::malformed("missing meta"))
            .and_then(Meta::from_value)?;
        Ok(Self { payload, meta })
    }

    /// Converts to the stored form.
    pub fn into_value(self) -> Value {
        let mut map = IndexMap::with_capacity(2);
        map.insert(PAYLOAD_FIELD.to_string(), self.payload);
        map.insert(META_FIELD.to_string(), self.meta.to_value());
        Value::Object(map)
    }

    /// The wrapped result.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The metadata.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::TIMESTAMP_FORMAT;

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map(|n| n.and_utc())
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&at.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let payload: Value = [("name", Value::from("alice")), ("tags", vec!["a"].into())]
            .into_iter()
            .collect();

        let (_, unpacked) = Envelope::unpack(Envelope::pack(payload.clone()).into_value()).unwrap();
        assert_eq!(unpacked, payload);
    }

    #[test]
    fn test_stored_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let stored = Envelope::packed_at(Value::from(1), at).into_value();

        let json = serde_json::to_string(&stored).unwrap();
        assert_eq!(json, r#"{"doc":1,"meta":{"updateTime":"2024-03-09 14:05:07"}}"#);
    }

    #[test]
    fn test_meta_survives_roundtrip() {
        let at = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let (meta, _) = Envelope::unpack(Envelope::packed_at(Value::Null, at).into_value()).unwrap();
        assert_eq!(meta.updated_at(), at);
    }

    #[test]
    fn test_unpack_rejects_non_envelopes() {
        assert!(Envelope::unpack(Value::from("plain")).is_err());
        assert!(Envelope::unpack([("doc", 1)].into_iter().collect()).is_err());

        let bad_time: Value = [
            ("doc", Value::from(1)),
            ("meta", [("updateTime", "yesterday")].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        let err = Envelope::unpack(bad_time).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_serde_matches_stored_form() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let envelope = Envelope::packed_at(Value::from(vec![1, 2]), at);

        let via_serde = serde_json::to_value(&envelope).unwrap();
        let via_value = serde_json::to_value(envelope.clone().into_value()).unwrap();
        assert_eq!(via_serde, via_value);

        let back: Envelope = serde_json::from_value(via_serde).unwrap();
        assert_eq!(back, envelope);
    }
}

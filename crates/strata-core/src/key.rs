//! Cache key derivation.
//!
//! Keys are built from `(model, operation, arguments...)`: composites are
//! flattened into `key#value` runs, elements are joined with `-`, and
//! everything outside `[A-Za-z0-9#-]` is stripped. Keys longer than
//! [`MAX_KEY_LEN`] collapse to the hex MD5 digest of the long form.
//!
//! The derivation is one-way and lossy: `"a-b"` and `"a.b"` style inputs can
//! collide after stripping. Existing cache entries depend on the exact
//! format, so it is kept as is.

use std::fmt;

use tracing::trace;

use crate::error::KeyError;
use crate::value::Value;

/// Maximum key length accepted by memcached-style backends.
pub const MAX_KEY_LEN: usize = 250;

/// A derived, non-empty cache key of at most [`MAX_KEY_LEN`] characters.
///
/// # Examples
///
/// ```
/// use strata_core::{CacheKey, Value};
///
/// let key = CacheKey::derive("users", "listUsers", &[Value::from(42)]).unwrap();
/// assert_eq!(key.as_str(), "users-listUsers-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for an operation call.
    ///
    /// Equal inputs always produce equal keys. Fails with [`KeyError::Empty`]
    /// when no alphanumeric character survives stripping.
    pub fn derive(model: &str, operation: &str, args: &[Value]) -> Result<Self, KeyError> {
        let mut parts = Vec::with_capacity(args.len() + 2);
        parts.push(model.to_string());
        parts.push(operation.to_string());
        parts.extend(args.iter().map(flatten));

        let key: String = parts
            .join("-")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '#')
            .collect();

        // model and operation always contribute a separator, so a key made
        // only of separators carries no identity
        if !key.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(KeyError::Empty);
        }

        let key = if key.len() > MAX_KEY_LEN {
            format!("{:x}", md5::compute(key.as_bytes()))
        } else {
            key
        };

        trace!(key = %key, "Derived cache key");
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is a digest of a longer key.
    pub fn is_hashed(&self) -> bool {
        self.0.len() == 32 && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Serializes one key element. Composites recurse without a separator
/// between entries; array entries are keyed by index.
fn flatten(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{i}#{}", flatten(v)))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}#{}", flatten(v)))
            .collect(),
        scalar => scalar_text(scalar),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => {
            let f = f.into_inner();
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", f as i64)
            } else {
                f.to_string()
            }
        },
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => flatten(value),
    }
}

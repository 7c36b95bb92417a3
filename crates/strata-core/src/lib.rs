//! Strata Core - Domain types for the tiered dispatcher
//!
//! This crate provides the building blocks shared by the stores and the
//! dispatcher: the dynamic [`Value`] type, [`CacheKey`] derivation, the
//! [`Envelope`] stored in the cache and storage tiers, per-operation
//! configuration, bypass controls and session diagnostics.

pub mod controls;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod key;
pub mod operation;
pub mod types;
pub mod value;

pub use controls::{AccessControls, BypassParams, BypassTarget};
pub use diagnostics::{Diagnostics, ErrorCode, ErrorState};
pub use envelope::{Envelope, Meta};
pub use error::{EnvelopeError, KeyError, Result, StrataError};
pub use key::{CacheKey, MAX_KEY_LEN};
pub use operation::{DEFAULT_CACHE_LIFETIME, OperationConfig};
pub use types::{DEFAULT_NAME, ModelName, StorageIndex, Tier};
pub use value::Value;

// Re-exported for callers building object arguments.
pub use indexmap::IndexMap;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

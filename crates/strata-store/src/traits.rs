//! Store trait definitions.

use std::time::Duration;

use async_trait::async_trait;
use strata_core::Value;

use crate::error::StoreError;

/// A key/value cache with per-entry lifetimes.
///
/// Implementations are shared between sessions and must be safe for
/// concurrent use.
///
/// # Example
///
/// ```ignore
/// use strata_store::{CacheStore, StoreError};
///
/// struct RedisStore { /* ... */ }
///
/// #[async_trait]
/// impl CacheStore for RedisStore {
///     async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
///         // Implementation here
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns true if a live entry exists for `key`.
    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Fetches the entry for `key`, `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Stores `value` under `key` without expiry.
    async fn put_forever(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Removes the entry for `key`. Returns whether one existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns the name of this store, used in traces and logs.
    fn name(&self) -> &str;
}

/// A durable document store addressed by index, type and id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document, `None` if it does not exist.
    async fn get_by_id(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Writes a document, replacing any existing one with the same id.
    async fn create(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        body: Value,
    ) -> Result<(), StoreError>;

    /// The backend's own description of its most recent failure.
    fn last_error(&self) -> Option<String> {
        None
    }

    /// Returns the name of this store, used in traces and logs.
    fn name(&self) -> &str;
}

//! In-process cache store backed by Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::counter;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use strata_core::Value;

use crate::error::StoreError;
use crate::traits::CacheStore;

/// Configuracion del cache en memoria.
#[derive(Debug, Clone)]
pub struct MokaCacheConfig {
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
}

impl Default for MokaCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

#[derive(Clone)]
struct Entry {
    value: Arc<Value>,
    ttl: Option<Duration>,
}

/// Each entry carries its own lifetime; `None` never expires.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// Thread-safe cache store with per-entry TTL.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use strata_core::Value;
/// use strata_store::{CacheStore, MokaCacheStore, MokaCacheConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), strata_store::StoreError> {
/// let cache = MokaCacheStore::new(MokaCacheConfig::default());
/// cache.put("users-listUsers", Value::from(1), Duration::from_secs(60)).await?;
///
/// if let Some(value) = cache.get("users-listUsers").await? {
///     println!("Cache hit: {value:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MokaCacheStore {
    name: String,
    inner: Cache<String, Entry>,
}

impl MokaCacheStore {
    /// Crea un nuevo cache con la configuracion dada.
    pub fn new(config: MokaCacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .eviction_listener(|_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                counter!("strata_cache_evictions_total", "reason" => reason).increment(1);
            })
            .build();

        Self {
            name: "moka".to_string(),
            inner,
        }
    }

    /// Renames the store as it appears in traces.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Runs pending maintenance so counts and expirations are current.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    async fn insert(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let entry = Entry {
            value: Arc::new(value),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .inner
            .get(key)
            .await
            .map(|entry| entry.value.as_ref().clone()))
    }

    /// A zero `ttl` stores the entry without expiry.
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        let ttl = (!ttl.is_zero()).then_some(ttl);
        self.insert(key, value, ttl).await
    }

    async fn put_forever(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.insert(key, value, None).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.remove(key).await.is_some())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

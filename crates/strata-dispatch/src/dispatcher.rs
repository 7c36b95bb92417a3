//! The tiered dispatcher: cache, then storage, then origin.
//!
//! A dispatch walks a fixed sequence of states and never goes back:
//!
//! 1. validate the operation and find its handler
//! 2. resolve the model name and derive the cache key
//! 3. read the cache (unless disabled or cleared)
//! 4. read the document store (unless disabled or cleared); a hit is copied
//!    into the cache
//! 5. run the origin handler
//! 6. write the packed result to the cache, then to the document store
//!
//! The first tier that yields a usable value ends the call. Storage write
//! failures are recorded but never fail the call, and never undo the cache
//! write that preceded them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use strata_core::{
    AccessControls, CacheKey, Diagnostics, Envelope, ErrorCode, KeyError, ModelName,
    OperationConfig, StorageIndex, StrataError, Tier, Value,
};
use strata_store::{CacheStore, DocumentStore};
use tracing::{debug, error, warn};

use crate::error::DispatchError;
use crate::metrics::TierMetrics;
use crate::origin::OriginRegistry;
use crate::session::Session;
use crate::settings::DispatcherSettings;

/// A successful dispatch: the payload and the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub value: Value,
    pub tier: Tier,
}

/// Read-through / write-through dispatcher over a cache, a document store
/// and a registry of origin handlers.
///
/// The dispatcher is immutable once built and can be shared. Per-request
/// state (bypass controls, trace, last error) lives in a [`Session`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use strata_core::Value;
/// use strata_dispatch::{OriginRegistry, TieredDispatcher};
/// use strata_store::{MokaCacheConfig, MokaCacheStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = OriginRegistry::new()
///     .with_fn("listUsers", |_| async { Ok(Some(Value::from(vec!["alice", "bob"]))) });
///
/// let dispatcher = TieredDispatcher::builder()
///     .cache(Arc::new(MokaCacheStore::new(MokaCacheConfig::default())))
///     .registry(registry)
///     .build()?;
///
/// let mut session = dispatcher.session();
/// let users = session.invoke("listUsers", vec![]).await?;
/// # Ok(())
/// # }
/// ```
pub struct TieredDispatcher {
    cache: Option<Arc<dyn CacheStore>>,
    storage: Option<Arc<dyn DocumentStore>>,
    registry: OriginRegistry,
    operations: OperationConfig,
    model_name: ModelName,
    storage_index: StorageIndex,
    controls: AccessControls,
    debug: bool,
    metrics: TierMetrics,
}

impl TieredDispatcher {
    /// Creates a new builder.
    pub fn builder() -> TieredDispatcherBuilder {
        TieredDispatcherBuilder::default()
    }

    /// Opens a session using the dispatcher's own controls.
    pub fn session(&self) -> Session<'_> {
        Session::new(self, AccessControls::default())
    }

    /// Opens a session with request-specific controls, merged with the
    /// dispatcher's own.
    pub fn session_with(&self, controls: AccessControls) -> Session<'_> {
        Session::new(self, controls)
    }

    /// Derives the key a call would use, after model name resolution.
    pub fn cache_key(&self, operation: &str, args: &[Value]) -> Result<CacheKey, KeyError> {
        let model = self.operations.resolve_model_name(operation, &self.model_name);
        CacheKey::derive(model.as_str(), operation, args)
    }

    /// The configured storage index.
    pub fn storage_index(&self) -> &StorageIndex {
        &self.storage_index
    }

    /// The configured model name, before per-operation resolution.
    pub fn model_name(&self) -> &ModelName {
        &self.model_name
    }

    /// The per-operation configuration.
    pub fn operations(&self) -> &OperationConfig {
        &self.operations
    }

    /// Controls applied to every session.
    pub fn controls(&self) -> AccessControls {
        self.controls
    }

    /// Whether sessions keep trace entries.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Tier counters.
    pub fn metrics(&self) -> &TierMetrics {
        &self.metrics
    }

    pub(crate) async fn run(
        &self,
        operation: &str,
        args: &[Value],
        controls: AccessControls,
        trace: &mut Diagnostics,
    ) -> Result<Served, DispatchError> {
        let start = Instant::now();
        let controls = self.controls.merge(controls);

        if operation.is_empty() {
            trace.record("operation name cannot be empty");
            return Err(fail(trace, DispatchError::handler_not_found(operation)));
        }
        let Some(handler) = self.registry.get(operation) else {
            return Err(fail(trace, DispatchError::handler_not_found(operation)));
        };

        let model = self.operations.resolve_model_name(operation, &self.model_name);
        let key = match CacheKey::derive(model.as_str(), operation, args) {
            Ok(key) => key,
            Err(e) => return Err(fail(trace, e.into())),
        };
        trace.record(format!("generate key: {key}"));
        let lifetime = self.operations.cache_lifetime(operation);

        let cache = self.cache.as_deref().filter(|_| !controls.cache_disabled);
        let storage = self.storage.as_deref().filter(|_| !controls.storage_disabled);

        if let Some(cache) = cache.filter(|_| controls.reads_cache()) {
            if let Some(value) = self.read_cache(cache, &key, trace).await {
                trace.record(format!("{operation} served from cache ({})", cache.name()));
                self.metrics.record_hit(Tier::Cache, start.elapsed());
                return Ok(Served {
                    value,
                    tier: Tier::Cache,
                });
            }
        }

        if let Some(storage) = storage.filter(|_| controls.reads_storage()) {
            if let Some((stored, value)) = self.read_storage(storage, &model, &key, trace).await {
                if let Some(cache) = cache {
                    self.write_cache(cache, &key, stored, lifetime, trace).await;
                }
                trace.record(format!("{operation} served from storage"));
                self.metrics.record_hit(Tier::Storage, start.elapsed());
                return Ok(Served {
                    value,
                    tier: Tier::Storage,
                });
            }
        }

        let value = match handler.call(args).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                let err = DispatchError::NoData {
                    operation: operation.to_string(),
                    arguments: format!("{args:?}"),
                };
                error!(operation = %operation, arguments = ?args, "No data returned from origin");
                self.metrics.record_origin_failure();
                return Err(fail(trace, err));
            },
            Err(e) => {
                error!(operation = %operation, error = %e, "Origin handler failed");
                self.metrics.record_origin_failure();
                let err = DispatchError::Origin {
                    operation: operation.to_string(),
                    message: e.message().to_string(),
                };
                return Err(fail(trace, err));
            },
        };

        let stored = Envelope::pack(value.clone()).into_value();
        if let Some(cache) = cache {
            self.write_cache(cache, &key, stored.clone(), lifetime, trace)
                .await;
        }
        if let Some(storage) = storage {
            self.write_storage(storage, &model, &key, stored, trace).await;
        }

        trace.record(format!("{operation} served from origin"));
        self.metrics.record_hit(Tier::Origin, start.elapsed());
        Ok(Served {
            value,
            tier: Tier::Origin,
        })
    }

    /// Reads and unpacks a cache entry. Misses, read errors and malformed
    /// entries all fall through to the next tier.
    async fn read_cache(
        &self,
        cache: &dyn CacheStore,
        key: &CacheKey,
        trace: &mut Diagnostics,
    ) -> Option<Value> {
        let stored = match cache.get(key.as_str()).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                self.metrics.record_miss(Tier::Cache);
                return None;
            },
            Err(e) => {
                warn!(key = %key, error = %e, transient = e.is_transient(), "Cache read failed");
                trace.record(format!("cache read failed: {e}"));
                self.metrics.record_miss(Tier::Cache);
                return None;
            },
        };

        match Envelope::unpack(stored) {
            Ok((_, value)) => Some(value),
            Err(e) => {
                trace.record(format!("discarding cache entry {key}: {e}"));
                self.metrics.record_miss(Tier::Cache);
                None
            },
        }
    }

    /// Reads a document, returning the raw stored form with its payload.
    async fn read_storage(
        &self,
        storage: &dyn DocumentStore,
        model: &ModelName,
        key: &CacheKey,
        trace: &mut Diagnostics,
    ) -> Option<(Value, Value)> {
        let stored = match storage
            .get_by_id(self.storage_index.as_str(), model.as_str(), key.as_str())
            .await
        {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                self.metrics.record_miss(Tier::Storage);
                return None;
            },
            Err(e) => {
                warn!(key = %key, error = %e, transient = e.is_transient(), "Storage read failed");
                trace.record(format!("storage read failed: {e}"));
                self.metrics.record_miss(Tier::Storage);
                return None;
            },
        };

        match Envelope::unpack(stored.clone()) {
            Ok((_, value)) => Some((stored, value)),
            Err(e) => {
                trace.record(format!("discarding storage document {key}: {e}"));
                self.metrics.record_miss(Tier::Storage);
                None
            },
        }
    }

    async fn write_cache(
        &self,
        cache: &dyn CacheStore,
        key: &CacheKey,
        stored: Value,
        lifetime: Duration,
        trace: &mut Diagnostics,
    ) {
        let result = if lifetime.is_zero() {
            cache.put_forever(key.as_str(), stored).await
        } else {
            cache.put(key.as_str(), stored, lifetime).await
        };

        match result {
            Ok(()) => debug!(key = %key, ttl_secs = lifetime.as_secs(), "Cached"),
            Err(e) => {
                warn!(key = %key, error = %e, "Cache write failed");
                self.metrics.record_write_failure(Tier::Cache);
                trace.set_error(ErrorCode::CacheWrite, format!("Cache error: {e}"));
            },
        }
    }

    async fn write_storage(
        &self,
        storage: &dyn DocumentStore,
        model: &ModelName,
        key: &CacheKey,
        stored: Value,
        trace: &mut Diagnostics,
    ) {
        let result = storage
            .create(self.storage_index.as_str(), model.as_str(), key.as_str(), stored)
            .await;

        if let Err(e) = result {
            let message = storage.last_error().unwrap_or_else(|| e.to_string());
            warn!(
                index = %self.storage_index,
                model = %model,
                key = %key,
                error = %message,
                "Storage write failed"
            );
            self.metrics.record_write_failure(Tier::Storage);
            trace.set_error(ErrorCode::StorageWrite, format!("Storage error: {message}"));
        }
    }
}

/// Records the error in the trace and hands it back.
fn fail(trace: &mut Diagnostics, err: DispatchError) -> DispatchError {
    trace.set_error(err.code(), err.to_string());
    err
}

/// Builder for [`TieredDispatcher`].
#[derive(Default)]
pub struct TieredDispatcherBuilder {
    cache: Option<Arc<dyn CacheStore>>,
    storage: Option<Arc<dyn DocumentStore>>,
    registry: OriginRegistry,
    operations: OperationConfig,
    model_name: Option<ModelName>,
    storage_index: Option<StorageIndex>,
    use_cache: Option<bool>,
    use_storage: Option<bool>,
    debug: Option<bool>,
    lifetime_error: Option<StrataError>,
}

impl TieredDispatcherBuilder {
    /// Starts from loaded settings. Stores still have to be attached.
    pub fn from_settings(settings: &DispatcherSettings) -> Result<Self, StrataError> {
        Ok(Self {
            operations: settings.operation_config()?,
            model_name: Some(settings.model()),
            storage_index: Some(settings.index()),
            use_cache: Some(settings.use_cache),
            use_storage: Some(settings.use_storage),
            debug: Some(settings.debug),
            ..Self::default()
        })
    }

    /// Sets the cache tier.
    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the storage tier. Storage is used only when also enabled with
    /// [`use_storage`](Self::use_storage) or settings.
    pub fn storage(mut self, storage: Arc<dyn DocumentStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the origin handlers.
    pub fn registry(mut self, registry: OriginRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the per-operation configuration.
    pub fn operations(mut self, operations: OperationConfig) -> Self {
        self.operations = operations;
        self
    }

    /// Overrides the lifetime of one operation.
    pub fn cache_lifetime(mut self, operation: &str, lifetime: Duration) -> Self {
        if let Err(e) = self.operations.set_cache_lifetime(operation, lifetime) {
            self.lifetime_error.get_or_insert(e);
        }
        self
    }

    /// Sets the explicit model name.
    pub fn model_name(mut self, model: impl Into<ModelName>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    /// Sets the document store index.
    pub fn storage_index(mut self, index: impl Into<StorageIndex>) -> Self {
        self.storage_index = Some(index.into());
        self
    }

    /// Enables or disables the cache tier (default: enabled).
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = Some(enabled);
        self
    }

    /// Enables or disables the storage tier (default: disabled).
    pub fn use_storage(mut self, enabled: bool) -> Self {
        self.use_storage = Some(enabled);
        self
    }

    /// Whether sessions keep trace entries (default: true).
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Fails if storage is enabled without a document store, or if a
    /// lifetime override named an empty operation.
    pub fn build(self) -> Result<TieredDispatcher, StrataError> {
        if let Some(e) = self.lifetime_error {
            return Err(e);
        }

        let use_cache = self.use_cache.unwrap_or(true);
        let use_storage = self.use_storage.unwrap_or(false);
        if use_storage && self.storage.is_none() {
            return Err(StrataError::validation_error(
                "storage",
                "storage tier enabled without a document store",
            ));
        }

        let controls = AccessControls {
            cache_disabled: !use_cache,
            storage_disabled: !use_storage,
            ..AccessControls::default()
        };

        Ok(TieredDispatcher {
            cache: self.cache,
            storage: self.storage,
            registry: self.registry,
            operations: self.operations,
            model_name: self.model_name.unwrap_or_default(),
            storage_index: self.storage_index.unwrap_or_default(),
            controls,
            debug: self.debug.unwrap_or(true),
            metrics: TierMetrics::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::{MemoryDocumentStore, MokaCacheConfig, MokaCacheStore};

    fn registry() -> OriginRegistry {
        OriginRegistry::new().with_fn("listUsers", |_| async {
            Ok(Some(Value::from(vec!["alice", "bob"])))
        })
    }

    #[test]
    fn test_builder_defaults() {
        let dispatcher = TieredDispatcher::builder().build().unwrap();

        assert!(dispatcher.model_name().is_default());
        assert_eq!(dispatcher.storage_index().as_str(), "default");
        assert!(!dispatcher.controls().cache_disabled);
        assert!(dispatcher.controls().storage_disabled);
        assert!(dispatcher.debug());
    }

    #[test]
    fn test_storage_enabled_without_store() {
        let result = TieredDispatcher::builder().use_storage(true).build();
        assert!(matches!(result, Err(StrataError::ValidationError { .. })));
    }

    #[test]
    fn test_empty_lifetime_operation_rejected() {
        let result = TieredDispatcher::builder()
            .cache_lifetime("", Duration::from_secs(1))
            .build();
        assert!(matches!(result, Err(StrataError::InvalidOperation { .. })));
    }

    #[test]
    fn test_cache_key_uses_resolved_model() {
        let dispatcher = TieredDispatcher::builder()
            .operations(OperationConfig::new().with_model("listUsers", "users"))
            .build()
            .unwrap();

        let key = dispatcher.cache_key("listUsers", &[Value::from(2)]).unwrap();
        assert_eq!(key.as_str(), "users-listUsers-2");
    }

    #[test]
    fn test_from_settings() {
        let settings = DispatcherSettings {
            use_storage: true,
            storage_index: "catalog".into(),
            debug: false,
            ..Default::default()
        };

        let dispatcher = TieredDispatcherBuilder::from_settings(&settings)
            .unwrap()
            .cache(Arc::new(MokaCacheStore::new(settings.cache_config())))
            .storage(Arc::new(MemoryDocumentStore::new()))
            .build()
            .unwrap();

        assert_eq!(dispatcher.storage_index().as_str(), "catalog");
        assert!(!dispatcher.controls().storage_disabled);
        assert!(!dispatcher.debug());
    }

    #[tokio::test]
    async fn test_run_records_key_and_tier() {
        let dispatcher = TieredDispatcher::builder()
            .cache(Arc::new(MokaCacheStore::new(MokaCacheConfig::default())))
            .registry(registry())
            .build()
            .unwrap();

        let mut trace = Diagnostics::new();
        let served = dispatcher
            .run("listUsers", &[], AccessControls::default(), &mut trace)
            .await
            .unwrap();

        assert_eq!(served.tier, Tier::Origin);
        assert!(trace.contains("generate key: default-listUsers"));
        assert!(trace.contains("listUsers served from origin"));
        assert_eq!(dispatcher.metrics().hits(Tier::Origin), 1);
    }
}

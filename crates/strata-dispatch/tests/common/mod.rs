#![allow(dead_code)]
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use strata_core::{Envelope, Value};
use strata_dispatch::{OriginError, OriginRegistry, TieredDispatcher, TieredDispatcherBuilder};
use strata_store::{DocumentStore, MemoryDocumentStore, MokaCacheConfig, MokaCacheStore, StoreError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a fmt subscriber once per test binary. Set `RUST_LOG` to see
/// dispatcher logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Stores and an origin call counter shared with the dispatcher under test.
pub struct Fixture {
    pub cache: Arc<MokaCacheStore>,
    pub storage: Arc<MemoryDocumentStore>,
    pub calls: Arc<AtomicU32>,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            cache: Arc::new(MokaCacheStore::new(MokaCacheConfig::default())),
            storage: Arc::new(MemoryDocumentStore::new()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Builder with both stores attached and storage enabled.
    pub fn builder(&self) -> TieredDispatcherBuilder {
        TieredDispatcher::builder()
            .cache(self.cache.clone())
            .storage(self.storage.clone())
            .use_storage(true)
    }

    /// Registry whose `op` returns `value` and counts its calls.
    pub fn returning(&self, op: &str, value: Value) -> OriginRegistry {
        let calls = Arc::clone(&self.calls);
        OriginRegistry::new().with_fn(op, move |_| {
            let calls = Arc::clone(&calls);
            let value = value.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(value))
            }
        })
    }

    /// Registry whose `op` fails with `message`.
    pub fn failing(&self, op: &str, message: &'static str) -> OriginRegistry {
        let calls = Arc::clone(&self.calls);
        OriginRegistry::new().with_fn(op, move |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(OriginError::new(message))
            }
        })
    }

    /// Registry whose `op` returns no data.
    pub fn empty(&self, op: &str) -> OriginRegistry {
        let calls = Arc::clone(&self.calls);
        OriginRegistry::new().with_fn(op, move |_| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        })
    }
}

pub fn users() -> Value {
    Value::from(vec!["alice", "bob"])
}

pub fn packed(value: Value) -> Value {
    Envelope::pack(value).into_value()
}

pub fn unpacked(stored: Option<Value>) -> Option<Value> {
    stored.map(|s| Envelope::unpack(s).expect("stored value should be an envelope").1)
}

/// Document store whose backend is never reachable.
pub struct UnreachableDocuments;

#[async_trait]
impl DocumentStore for UnreachableDocuments {
    async fn get_by_id(&self, _: &str, _: &str, _: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn create(&self, _: &str, _: &str, _: &str, _: Value) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

//! In-memory document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use strata_core::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::DocumentStore;

type DocumentId = (String, String, String);

/// Document store keeping everything in a map keyed by
/// `(index, type, id)`.
///
/// The store can be switched to read-only, in which case every write is
/// rejected and the reason is kept as [`DocumentStore::last_error`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Value>>,
    last_error: RwLock<Option<String>>,
    read_only: AtomicBool,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects (or accepts again) every subsequent write.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of stored documents across all indexes.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn fail(&self, err: StoreError) -> StoreError {
        *self.last_error.write() = Some(err.to_string());
        err
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_by_id(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let key = (index.to_string(), type_name.to_string(), id.to_string());
        Ok(self.documents.read().get(&key).cloned())
    }

    async fn create(
        &self,
        index: &str,
        type_name: &str,
        id: &str,
        body: Value,
    ) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(self.fail(StoreError::InvalidKey(id.to_string())));
        }
        if self.read_only.load(Ordering::SeqCst) {
            return Err(self.fail(StoreError::write_rejected(
                self.name(),
                format!("index '{index}' is read-only"),
            )));
        }

        let key = (index.to_string(), type_name.to_string(), id.to_string());
        let replaced = self.documents.write().insert(key, body).is_some();
        debug!(index = %index, type_name = %type_name, id = %id, replaced, "Document stored");
        Ok(())
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn name(&self) -> &str {
        "memory"
    }
}

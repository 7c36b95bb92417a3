//! # Strata Store
//!
//! Store abstractions consumed by the Strata dispatcher.
//!
//! ## Features
//!
//! - [`CacheStore`]: key/value cache with per-entry lifetimes
//! - [`DocumentStore`]: durable storage addressed by index, type and id
//! - [`MokaCacheStore`]: in-process cache built on Moka
//! - [`MemoryDocumentStore`]: map-backed document store
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_store::{CacheStore, MokaCacheStore, MokaCacheConfig};
//!
//! let cache: Arc<dyn CacheStore> = Arc::new(MokaCacheStore::new(MokaCacheConfig::default()));
//! cache.put("users-listUsers", value, ttl).await?;
//! ```

pub mod error;
pub mod memory_documents;
pub mod moka_cache;
pub mod traits;

// Re-exports
pub use error::StoreError;
pub use memory_documents::MemoryDocumentStore;
pub use moka_cache::{MokaCacheConfig, MokaCacheStore};
pub use traits::{CacheStore, DocumentStore};

// Re-export strata_core for consumers
pub use strata_core;

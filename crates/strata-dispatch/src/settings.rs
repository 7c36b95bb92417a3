//! Dispatcher settings loaded from a file and the environment.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use strata_core::{ModelName, OperationConfig, StorageIndex};
use strata_store::MokaCacheConfig;

/// Prefix for environment overrides, e.g. `STRATA_USE_STORAGE=true`.
pub const ENV_PREFIX: &str = "STRATA";

/// Settings for one operation.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationSettings {
    /// Operation name, matched case-sensitively.
    pub name: String,
    /// Cache lifetime in seconds; 0 caches forever.
    #[serde(default)]
    pub lifetime_secs: Option<u64>,
    /// Model the operation belongs to when no explicit model is set.
    #[serde(default)]
    pub model: Option<String>,
}

/// Top-level dispatcher settings.
///
/// ```toml
/// default_lifetime_secs = 600
/// storage_index = "catalog"
/// use_storage = true
///
/// [[operations]]
/// name = "listUsers"
/// lifetime_secs = 60
/// model = "users"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    /// Lifetime for operations without an override (default: 7200).
    pub default_lifetime_secs: u64,
    /// Document store index (default: "default").
    pub storage_index: String,
    /// Explicit model name (default: the "default" sentinel).
    pub model_name: String,
    /// Whether the cache tier is used (default: true).
    pub use_cache: bool,
    /// Whether the storage tier is used (default: false).
    pub use_storage: bool,
    /// Whether sessions keep trace entries (default: true).
    pub debug: bool,
    /// Maximum entries held by the in-process cache (default: 10000).
    pub cache_capacity: u64,
    /// Per-operation overrides.
    pub operations: Vec<OperationSettings>,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            default_lifetime_secs: 7200,
            storage_index: strata_core::DEFAULT_NAME.to_string(),
            model_name: strata_core::DEFAULT_NAME.to_string(),
            use_cache: true,
            use_storage: false,
            debug: true,
            cache_capacity: 10_000,
            operations: Vec::new(),
        }
    }
}

impl DispatcherSettings {
    /// Loads settings from an optional file, then `STRATA_*` variables.
    ///
    /// # Errors
    ///
    /// Returns the `config` error if the file cannot be read or a value has
    /// the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Same as [`load`](Self::load) with an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder.add_source(env).build()?.try_deserialize()
    }

    /// Builds the per-operation configuration.
    ///
    /// # Errors
    ///
    /// Fails when an operation entry has an empty name.
    pub fn operation_config(&self) -> strata_core::Result<OperationConfig> {
        let mut ops = OperationConfig::new()
            .with_default_lifetime(Duration::from_secs(self.default_lifetime_secs));

        let mut models = HashMap::new();
        for op in &self.operations {
            if let Some(secs) = op.lifetime_secs {
                ops.set_cache_lifetime(&op.name, Duration::from_secs(secs))?;
            }
            if let Some(model) = &op.model {
                models.insert(op.name.clone(), ModelName::new(model.as_str()));
            }
        }
        ops.set_model_map(models);
        Ok(ops)
    }

    /// Capacity settings for [`strata_store::MokaCacheStore`].
    pub fn cache_config(&self) -> MokaCacheConfig {
        MokaCacheConfig {
            max_capacity: self.cache_capacity,
        }
    }

    pub fn model(&self) -> ModelName {
        ModelName::new(self.model_name.as_str())
    }

    pub fn index(&self) -> StorageIndex {
        StorageIndex::new(self.storage_index.as_str())
    }
}

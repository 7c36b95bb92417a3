//! Per-operation configuration: cache lifetimes and model names.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, StrataError};
use crate::types::ModelName;

/// Lifetime applied when an operation has no override (120 minutes).
pub const DEFAULT_CACHE_LIFETIME: Duration = Duration::from_secs(120 * 60);

/// Resolves, per operation name, the model it belongs to and how long its
/// results stay cached.
///
/// A zero lifetime means "cache forever".
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use strata_core::{ModelName, OperationConfig};
///
/// let mut ops = OperationConfig::new().with_model("listUsers", "users");
/// ops.set_cache_lifetime("listUsers", Duration::from_secs(60)).unwrap();
///
/// assert_eq!(ops.cache_lifetime("listUsers"), Duration::from_secs(60));
/// assert_eq!(
///     ops.resolve_model_name("listUsers", &ModelName::default()),
///     ModelName::new("users"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct OperationConfig {
    default_lifetime: Duration,
    lifetimes: HashMap<String, Duration>,
    model_map: HashMap<String, ModelName>,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            default_lifetime: DEFAULT_CACHE_LIFETIME,
            lifetimes: HashMap::new(),
            model_map: HashMap::new(),
        }
    }
}

impl OperationConfig {
    /// Creates a config with the default lifetime and no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the process-wide default lifetime.
    pub fn with_default_lifetime(mut self, lifetime: Duration) -> Self {
        self.default_lifetime = lifetime;
        self
    }

    /// Maps an operation to a model name.
    pub fn with_model(mut self, operation: impl Into<String>, model: impl Into<ModelName>) -> Self {
        self.model_map.insert(operation.into(), model.into());
        self
    }

    /// Returns the process-wide default lifetime.
    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    /// Returns the lifetime for an operation, falling back to the default.
    pub fn cache_lifetime(&self, operation: &str) -> Duration {
        self.lifetimes
            .get(operation)
            .copied()
            .unwrap_or(self.default_lifetime)
    }

    /// Overrides the lifetime of one operation.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidOperation`] for an empty name.
    pub fn set_cache_lifetime(&mut self, operation: &str, lifetime: Duration) -> Result<()> {
        if operation.is_empty() {
            return Err(StrataError::invalid_operation(
                operation,
                "operation name cannot be empty",
            ));
        }
        self.lifetimes.insert(operation.to_string(), lifetime);
        Ok(())
    }

    /// Replaces the static operation -> model mapping.
    pub fn set_model_map(&mut self, map: HashMap<String, ModelName>) {
        self.model_map = map;
    }

    /// Returns the static operation -> model mapping.
    pub fn model_map(&self) -> &HashMap<String, ModelName> {
        &self.model_map
    }

    /// Picks the model name for one call.
    ///
    /// An explicit model name wins. When `current` is unset or the
    /// `"default"` sentinel, the static mapping is consulted; without a
    /// mapping the result is the `"default"` sentinel, never an empty name.
    pub fn resolve_model_name(&self, operation: &str, current: &ModelName) -> ModelName {
        if !current.is_default() {
            return current.clone();
        }
        self.model_map
            .get(operation)
            .filter(|m| !m.as_str().is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

//! Common type definitions and newtypes for Strata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used for an unset model name or storage index.
pub const DEFAULT_NAME: &str = "default";

/// Logical collection an operation belongs to.
///
/// The model name prefixes cache keys and is used as the document type in
/// the storage tier.
///
/// # Example
///
/// ```
/// use strata_core::ModelName;
///
/// let model = ModelName::new("users");
/// assert_eq!(model.as_str(), "users");
/// assert!(ModelName::default().is_default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Creates a new ModelName.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the model name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the name is empty or the `"default"` sentinel.
    pub fn is_default(&self) -> bool {
        self.0.is_empty() || self.0 == DEFAULT_NAME
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Index in the document store that write-backs target.
///
/// # Example
///
/// ```
/// use strata_core::StorageIndex;
///
/// let index = StorageIndex::new("catalog");
/// assert_eq!(index.as_str(), "catalog");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageIndex(String);

impl StorageIndex {
    /// Creates a new StorageIndex.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the index name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StorageIndex {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl fmt::Display for StorageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StorageIndex {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StorageIndex {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The tier that served a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// The fast key/value cache.
    Cache,
    /// The durable document store.
    Storage,
    /// The origin computation.
    Origin,
}

impl Tier {
    /// Returns the lowercase tier name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Cache => "cache",
            Tier::Storage => "storage",
            Tier::Origin => "origin",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_sentinel() {
        assert!(ModelName::default().is_default());
        assert!(ModelName::new("").is_default());
        assert!(!ModelName::new("users").is_default());
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::Cache.to_string(), "cache");
        assert_eq!(Tier::Storage.to_string(), "storage");
        assert_eq!(Tier::Origin.to_string(), "origin");
    }

    #[test]
    fn test_storage_index_serde_transparent() {
        let index: StorageIndex = serde_json::from_str(r#""catalog""#).unwrap();
        assert_eq!(index, StorageIndex::new("catalog"));
    }
}

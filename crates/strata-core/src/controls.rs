//! Tier bypass controls.

use serde::Deserialize;

/// Per-session flags gating the cache and storage tiers.
///
/// `*_disabled` turns a tier off for both reads and write-backs.
/// `clear_*_on_read` only skips the read, so the write-back that follows
/// overwrites whatever the tier held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessControls {
    /// Never read from or write to the cache.
    pub cache_disabled: bool,
    /// Never read from or write to the document store.
    pub storage_disabled: bool,
    /// Skip the cache read; the result is still written back.
    pub clear_cache_on_read: bool,
    /// Skip the storage read; the result is still written back.
    pub clear_storage_on_read: bool,
}

impl AccessControls {
    /// All tiers enabled, nothing cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables the cache tier.
    pub fn without_cache(mut self) -> Self {
        self.cache_disabled = true;
        self
    }

    /// Disables the storage tier.
    pub fn without_storage(mut self) -> Self {
        self.storage_disabled = true;
        self
    }

    /// Forces a cache refresh.
    pub fn clearing_cache(mut self) -> Self {
        self.clear_cache_on_read = true;
        self
    }

    /// Forces a storage refresh.
    pub fn clearing_storage(mut self) -> Self {
        self.clear_storage_on_read = true;
        self
    }

    /// Combines two sets of controls; a flag set in either is set.
    pub fn merge(self, other: Self) -> Self {
        Self {
            cache_disabled: self.cache_disabled || other.cache_disabled,
            storage_disabled: self.storage_disabled || other.storage_disabled,
            clear_cache_on_read: self.clear_cache_on_read || other.clear_cache_on_read,
            clear_storage_on_read: self.clear_storage_on_read || other.clear_storage_on_read,
        }
    }

    /// True when the cache may be read.
    pub fn reads_cache(&self) -> bool {
        !self.cache_disabled && !self.clear_cache_on_read
    }

    /// True when the document store may be read.
    pub fn reads_storage(&self) -> bool {
        !self.storage_disabled && !self.clear_storage_on_read
    }
}

/// Which tiers a request parameter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassTarget {
    Cache,
    Storage,
    Both,
}

impl BypassTarget {
    /// Parses `cache`, `storage` or `both`. Anything else is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cache" => Some(Self::Cache),
            "storage" => Some(Self::Storage),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    fn hits_cache(self) -> bool {
        matches!(self, Self::Cache | Self::Both)
    }

    fn hits_storage(self) -> bool {
        matches!(self, Self::Storage | Self::Both)
    }
}

/// Bypass parameters as they arrive on an inbound request
/// (`?disable=cache&clear=storage`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BypassParams {
    /// Tiers to turn off entirely.
    pub disable: Option<String>,
    /// Tiers to refresh.
    pub clear: Option<String>,
}

impl BypassParams {
    /// Converts the parameters into controls.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_core::BypassParams;
    ///
    /// let params = BypassParams { disable: Some("storage".into()), clear: Some("cache".into()) };
    /// let controls = params.into_controls();
    /// assert!(controls.storage_disabled);
    /// assert!(controls.clear_cache_on_read);
    /// assert!(!controls.cache_disabled);
    /// ```
    pub fn into_controls(self) -> AccessControls {
        let disable = self.disable.as_deref().and_then(BypassTarget::parse);
        let clear = self.clear.as_deref().and_then(BypassTarget::parse);

        AccessControls {
            cache_disabled: disable.is_some_and(BypassTarget::hits_cache),
            storage_disabled: disable.is_some_and(BypassTarget::hits_storage),
            clear_cache_on_read: clear.is_some_and(BypassTarget::hits_cache),
            clear_storage_on_read: clear.is_some_and(BypassTarget::hits_storage),
        }
    }
}

impl From<BypassParams> for AccessControls {
    fn from(params: BypassParams) -> Self {
        params.into_controls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(disable: Option<&str>, clear: Option<&str>) -> BypassParams {
        BypassParams {
            disable: disable.map(String::from),
            clear: clear.map(String::from),
        }
    }

    #[test]
    fn test_default_reads_everything() {
        let controls = AccessControls::new();
        assert!(controls.reads_cache());
        assert!(controls.reads_storage());
    }

    #[test]
    fn test_clear_skips_reads_only() {
        let controls = AccessControls::new().clearing_cache();
        assert!(!controls.reads_cache());
        assert!(!controls.cache_disabled);
        assert!(controls.reads_storage());
    }

    #[test]
    fn test_both_targets() {
        let controls = params(Some("both"), Some("both")).into_controls();
        assert_eq!(
            controls,
            AccessControls {
                cache_disabled: true,
                storage_disabled: true,
                clear_cache_on_read: true,
                clear_storage_on_read: true,
            }
        );
    }

    #[test]
    fn test_unknown_values_ignored() {
        let controls = params(Some("everything"), Some("CACHE")).into_controls();
        assert_eq!(controls, AccessControls::default());
    }

    #[test]
    fn test_deserialize_from_query_shape() {
        let parsed: BypassParams = serde_json::from_str(r#"{"disable":"cache"}"#).unwrap();
        let controls: AccessControls = parsed.into();
        assert!(controls.cache_disabled);
        assert!(!controls.storage_disabled);
    }

    #[test]
    fn test_merge_is_union() {
        let merged = AccessControls::new()
            .without_storage()
            .merge(AccessControls::new().clearing_cache());
        assert!(merged.storage_disabled);
        assert!(merged.clear_cache_on_read);
        assert!(!merged.cache_disabled);
    }
}

//! Error types for cache and document stores.

/// Errors that can occur when talking to a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend is not reachable.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The backend rejected a write.
    #[error("write rejected by {store}: {reason}")]
    WriteRejected { store: String, reason: String },

    /// The key or document id is not acceptable to the backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A timeout occurred while waiting for the backend.
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new write-rejected error.
    pub fn write_rejected(store: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteRejected {
            store: store.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unavailable("connection refused");
        assert_eq!(err.to_string(), "store unavailable: connection refused");

        let err = StoreError::write_rejected("memory", "index is read-only");
        assert_eq!(
            err.to_string(),
            "write rejected by memory: index is read-only"
        );

        let err = StoreError::InvalidKey(String::new());
        assert_eq!(err.to_string(), "invalid key: ");
    }

    #[test]
    fn test_is_transient() {
        assert!(StoreError::unavailable("network error").is_transient());
        assert!(StoreError::Timeout { seconds: 3 }.is_transient());
        assert!(!StoreError::write_rejected("memory", "full").is_transient());
        assert!(!StoreError::InvalidKey("k".into()).is_transient());
    }
}

//! Error types for dispatching.

use strata_core::{ErrorCode, KeyError};

/// Error raised by an origin handler.
///
/// The message is what ends up in the session's last error.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct OriginError {
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl OriginError {
    /// Creates an origin error without a cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an origin error wrapping an underlying failure.
    pub fn with_cause<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The handler's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reasons a dispatch fails.
///
/// Storage write failures never surface here; they are recorded in the
/// session diagnostics and the call still succeeds.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Empty operation name, or no handler registered under it.
    #[error("operation '{operation}' has no registered handler")]
    HandlerNotFound { operation: String },

    /// The cache key could not be derived.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The origin handler returned an error.
    #[error("{message}")]
    Origin { operation: String, message: String },

    /// The origin handler returned no data.
    #[error("no data returned from operation '{operation}' with arguments {arguments}")]
    NoData { operation: String, arguments: String },
}

impl DispatchError {
    /// Creates a HandlerNotFound error.
    pub fn handler_not_found(operation: impl Into<String>) -> Self {
        Self::HandlerNotFound {
            operation: operation.into(),
        }
    }

    /// The code recorded in the session's error state.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::HandlerNotFound { .. } => ErrorCode::HandlerNotFound,
            Self::Key(_) => ErrorCode::EmptyKey,
            Self::Origin { .. } => ErrorCode::OriginFailure,
            Self::NoData { .. } => ErrorCode::NoData,
        }
    }

    /// Returns true if the origin tier was reached and failed.
    pub fn is_origin_failure(&self) -> bool {
        matches!(self, Self::Origin { .. } | Self::NoData { .. })
    }
}

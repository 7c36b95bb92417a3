//! Error types for Strata.
//!
//! This module defines the errors raised by the core domain types.
//! All errors implement the standard `std::error::Error` trait via
//! `thiserror`.
//!
//! # Example
//!
//! ```
//! use strata_core::{Result, StrataError};
//!
//! fn operation_name(name: &str) -> Result<&str> {
//!     if name.is_empty() {
//!         return Err(StrataError::invalid_operation(name, "operation name cannot be empty"));
//!     }
//!     Ok(name)
//! }
//!
//! assert!(operation_name("").is_err());
//! ```

use thiserror::Error;

/// Failure while deriving a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Nothing survived serialization and character stripping.
    #[error("cache key cannot be empty")]
    Empty,
}

/// Failure while unpacking a stored envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The stored value does not have the `doc`/`meta` shape.
    #[error("malformed envelope: {0}")]
    Malformed(String),
}

impl EnvelopeError {
    /// Creates a Malformed error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

/// Main error type for the core domain.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Operation name is invalid or empty.
    #[error("Invalid operation '{name}': {reason}")]
    InvalidOperation {
        /// The invalid name provided
        name: String,
        /// Why it's invalid
        reason: String,
    },

    /// Cache key derivation failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A stored envelope could not be read back.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// Validation error for a configuration value.
    #[error("Validation error for field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl StrataError {
    /// Creates an InvalidOperation error.
    pub fn invalid_operation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a ValidationError.
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a key derivation error.
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Returns true if this is a malformed envelope.
    pub fn is_envelope_error(&self) -> bool {
        matches!(self, Self::Envelope(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }
}

/// Type alias for Results with StrataError.
pub type Result<T> = std::result::Result<T, StrataError>;

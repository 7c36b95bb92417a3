//! Trace log and last-error slot for a dispatch session.

use std::fmt;

use tracing::debug;

/// Classifies a recorded error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No handler registered for the operation, or an empty name.
    HandlerNotFound,
    /// Key derivation produced nothing usable.
    EmptyKey,
    /// The origin handler failed.
    OriginFailure,
    /// The origin handler returned no data.
    NoData,
    /// Writing to the cache tier failed.
    CacheWrite,
    /// Writing to the document store failed.
    StorageWrite,
}

impl ErrorCode {
    /// Stable identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::HandlerNotFound => "handler_not_found",
            ErrorCode::EmptyKey => "empty_key",
            ErrorCode::OriginFailure => "origin_failure",
            ErrorCode::NoData => "no_data",
            ErrorCode::CacheWrite => "cache_write",
            ErrorCode::StorageWrite => "storage_write",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recent error of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.code, self.message)
    }
}

/// Append-only trace entries plus a single last-error slot.
///
/// When tracing is switched off (`Diagnostics::silent`), entries are
/// dropped but the last error is still kept.
///
/// # Example
///
/// ```
/// use strata_core::{Diagnostics, ErrorCode};
///
/// let mut diag = Diagnostics::new();
/// diag.record("generate key: users-listUsers");
/// diag.set_error(ErrorCode::OriginFailure, "timeout");
///
/// assert_eq!(diag.entries().len(), 2);
/// assert_eq!(diag.last_error().map(|e| e.message.as_str()), Some("timeout"));
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostics {
    enabled: bool,
    entries: Vec<String>,
    last_error: Option<ErrorState>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates an empty, enabled trace.
    pub fn new() -> Self {
        Self {
            enabled: true,
            entries: Vec::new(),
            last_error: None,
        }
    }

    /// Creates a trace that keeps no entries.
    pub fn silent() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Returns whether entries are kept.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends a trace entry.
    pub fn record(&mut self, message: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let message = message.into();
        debug!(trace = %message);
        self.entries.push(message);
    }

    /// Overwrites the last error and appends it to the trace.
    pub fn set_error(&mut self, code: ErrorCode, message: impl Into<String>) {
        let state = ErrorState {
            code,
            message: message.into(),
        };
        self.record(state.to_string());
        self.last_error = Some(state);
    }

    /// Trace entries in the order they were recorded.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The most recent error, if any.
    pub fn last_error(&self) -> Option<&ErrorState> {
        self.last_error.as_ref()
    }

    /// True if any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.contains(needle))
    }

    /// Moves another trace onto the end of this one. Its last error, if any,
    /// replaces ours.
    pub fn absorb(&mut self, other: Diagnostics) {
        if self.enabled {
            self.entries.extend(other.entries);
        }
        if other.last_error.is_some() {
            self.last_error = other.last_error;
        }
    }
}

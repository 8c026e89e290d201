//! Core error types for the gearlog ledger.
//!
//! This module defines store-agnostic error types. Backend-specific errors
//! (HTTP clients, realtime channels, SQL drivers) are converted to
//! [`StoreError`] by the adapter that implements [`crate::records::RemoteStore`].

use thiserror::Error;

use crate::ledger::SourceKind;
use crate::records::WriteOperation;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by backing-store adapters.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Root error type for the ledger core.
///
/// All variants are cloneable so the aggregator can keep the last refresh
/// failure around for display while also handing it back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A `list()` call against one of the record sources failed.
    #[error("Failed to read {kind} records: {error}")]
    SourceRead { kind: SourceKind, error: StoreError },

    /// A write was applied optimistically, rejected by the store and rolled back.
    #[error("Failed to {operation} {kind} record: {error}")]
    SourceWrite {
        kind: SourceKind,
        operation: WriteOperation,
        error: StoreError,
    },

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{kind} record not found: {id}")]
    NotFound { kind: SourceKind, id: String },

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Wraps a store failure that happened while reading a source.
    pub fn source_read(kind: SourceKind, error: StoreError) -> Self {
        Self::SourceRead { kind, error }
    }

    /// Wraps a store failure that happened while writing to a source.
    pub fn source_write(kind: SourceKind, operation: WriteOperation, error: StoreError) -> Self {
        Self::SourceWrite {
            kind,
            operation,
            error,
        }
    }

    /// Returns the record source this error originated from, if any.
    pub fn source_kind(&self) -> Option<SourceKind> {
        match self {
            Error::SourceRead { kind, .. }
            | Error::SourceWrite { kind, .. }
            | Error::NotFound { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Store-agnostic error type for backing-store operations.
///
/// This enum uses `String` for all error details, allowing adapters to
/// convert their specific errors into this format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Failed to reach store: {0}")]
    ConnectionFailed(String),

    /// The session is missing or no longer valid.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The store refused the write (constraint, policy or validation failure).
    #[error("Rejected by store: {0}")]
    Rejected(String),

    /// The requested row does not exist in the store.
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Validation errors for caller-supplied records.
///
/// These are raised synchronously, before any optimistic change is applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount for '{field}' cannot be negative: {value}")]
    NegativeAmount { field: String, value: String },

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

//! # Error Types
//!
//! Structured error types for grid_core. Every public operation that can
//! reject its input returns a [`GridResult`], so callers (edit controllers,
//! the CLI) can drop the operation without any unwinding. A rejected
//! operation never leaves a partially mutated snapshot behind.
//!
//! Two conditions are deliberately *not* errors:
//!
//! - shrinking below one row/column leaves the topology unchanged
//! - a missing dimension field counts as `0` in load estimates
//!
//! ## Example
//!
//! ```rust
//! use grid_core::addressing::parse_position;
//! use grid_core::errors::GridError;
//!
//! let err = parse_position("B2").unwrap_err();
//! assert!(matches!(err, GridError::MalformedKey { .. }));
//! assert_eq!(err.error_code(), "MALFORMED_KEY");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for grid_core operations
pub type GridResult<T> = Result<T, GridError>;

/// Structured error type for grid operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum GridError {
    /// A key does not parse under the addressing scheme
    #[error("Malformed key '{key}': expected {expected}")]
    MalformedKey { key: String, expected: String },

    /// A key parses but lies outside the current topology
    #[error("Key '{key}' is outside the {rows}x{cols} grid")]
    OutOfRange { key: String, rows: u32, cols: u32 },

    /// A distance along a beam is negative or not a number
    #[error("Invalid distance along beam: {value} mm")]
    InvalidDistance { value: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Snapshot file is locked by another editor
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl GridError {
    /// Create a MalformedKey error
    pub fn malformed_key(key: impl Into<String>, expected: impl Into<String>) -> Self {
        GridError::MalformedKey {
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(key: impl Into<String>, rows: u32, cols: u32) -> Self {
        GridError::OutOfRange {
            key: key.into(),
            rows,
            cols,
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GridError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        GridError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        GridError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the edit itself (bad key, bad distance).
    ///
    /// Edit controllers treat these as "discard the operation"; everything
    /// else comes from the persistence side.
    pub fn is_rejected_edit(&self) -> bool {
        matches!(
            self,
            GridError::MalformedKey { .. }
                | GridError::OutOfRange { .. }
                | GridError::InvalidDistance { .. }
        )
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GridError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GridError::MalformedKey { .. } => "MALFORMED_KEY",
            GridError::OutOfRange { .. } => "OUT_OF_RANGE",
            GridError::InvalidDistance { .. } => "INVALID_DISTANCE",
            GridError::FileError { .. } => "FILE_ERROR",
            GridError::FileLocked { .. } => "FILE_LOCKED",
            GridError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

//! Execution engine error types.
//!
//! Errors fall into two disjoint classes:
//!
//! - **Expected** errors are caused by invalid input values reachable from
//!   untrusted query input (a negative substring length, an exhausted
//!   memory budget). They are converted to a query-level failure at the
//!   pipeline boundary and never indicate a bug.
//! - **Internal** errors are invariant violations unreachable from valid
//!   input (a dispatch-table gap, a declared-type mismatch). They are
//!   fatal to the query, carry enough context to diagnose, and are never
//!   retried.

use std::fmt;
use thiserror::Error;

use crate::callsite;
use crate::types::PhysType;

/// Classification of an error as user-visible or engine-internal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Caused by invalid input data; recoverable at the query boundary.
    Expected,
    /// Caused by an engine invariant violation; fatal and non-recoverable.
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => write!(f, "expected"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and are stable
/// across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Internal error (bug).
    Internal = 0x0001,
    /// Operation was cancelled.
    Cancelled = 0x0002,
    /// Invalid configuration.
    InvalidConfig = 0x0003,

    // Execution errors (0x0100 - 0x01FF)
    /// Declared column type does not match the vector's storage.
    TypeMismatch = 0x0100,
    /// No kernel specialization exists for an argument type combination.
    UnsupportedKernelTypes = 0x0101,
    /// Column index outside the batch schema.
    ColumnOutOfRange = 0x0102,
    /// Negative substring length in a query argument.
    NegativeSubstringLength = 0x0103,

    // Memory errors (0x0200 - 0x02FF)
    /// Per-query memory budget exceeded.
    MemoryBudgetExceeded = 0x0200,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Execution",
            0x02 => "Memory",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for the CorvusDB execution engine.
///
/// Each variant includes relevant context for debugging. Use
/// [`CorvusError::class`] to decide whether a failure may be surfaced to
/// the client as a query error or must be treated as an engine bug.
///
/// # Example
///
/// ```rust
/// use corvus_common::error::{CorvusError, ErrorClass};
///
/// let err = CorvusError::NegativeSubstringLength { length: -1 };
/// assert_eq!(err.class(), ErrorClass::Expected);
/// ```
#[derive(Debug, Error)]
pub enum CorvusError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message} (at {origin})")]
    Internal {
        /// Error message.
        message: String,
        /// Source location of the failed invariant.
        origin: String,
    },

    /// Operation was cancelled.
    #[error("query execution cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Execution Errors
    // ==========================================================================
    /// Declared column type does not match the vector's storage.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The type the access expected.
        expected: PhysType,
        /// The type the vector actually stores.
        actual: PhysType,
    },

    /// No kernel specialization exists for an argument type combination.
    #[error("unsupported {kernel} argument types: {start} {length}")]
    UnsupportedKernelTypes {
        /// Name of the kernel whose dispatch table has no entry.
        kernel: &'static str,
        /// Declared type of the start argument.
        start: PhysType,
        /// Declared type of the length argument.
        length: PhysType,
    },

    /// Column index outside the batch schema.
    #[error("column index {index} out of range for batch of width {width}")]
    ColumnOutOfRange {
        /// The requested column index.
        index: usize,
        /// The number of columns in the batch.
        width: usize,
    },

    /// Negative substring length in a query argument.
    #[error("negative substring length {length} not allowed")]
    NegativeSubstringLength {
        /// The offending length value.
        length: i64,
    },

    // ==========================================================================
    // Memory Errors
    // ==========================================================================
    /// Per-query memory budget exceeded.
    #[error(
        "memory budget exceeded: requested {requested} bytes, \
         {used} of {budget} bytes in use"
    )]
    MemoryBudgetExceeded {
        /// Bytes requested by the failing allocation.
        requested: usize,
        /// Bytes charged to the ledger at the time of the request.
        used: usize,
        /// The configured budget.
        budget: usize,
    },
}

impl CorvusError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::UnsupportedKernelTypes { .. } => ErrorCode::UnsupportedKernelTypes,
            Self::ColumnOutOfRange { .. } => ErrorCode::ColumnOutOfRange,
            Self::NegativeSubstringLength { .. } => ErrorCode::NegativeSubstringLength,
            Self::MemoryBudgetExceeded { .. } => ErrorCode::MemoryBudgetExceeded,
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Internal { .. }
            | Self::TypeMismatch { .. }
            | Self::UnsupportedKernelTypes { .. }
            | Self::ColumnOutOfRange { .. } => ErrorClass::Internal,
            Self::Cancelled
            | Self::InvalidConfig { .. }
            | Self::NegativeSubstringLength { .. }
            | Self::MemoryBudgetExceeded { .. } => ErrorClass::Expected,
        }
    }

    /// Returns true if this error is an engine bug.
    #[inline]
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.class(), ErrorClass::Internal)
    }

    /// Returns true if this error may be surfaced as a query failure.
    #[inline]
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self.class(), ErrorClass::Expected)
    }

    /// Creates an internal error annotated with the caller's source
    /// location.
    #[must_use]
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            origin: callsite::caller(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = CorvusError::MemoryBudgetExceeded {
            requested: 1024,
            used: 0,
            budget: 512,
        };
        assert_eq!(err.code(), ErrorCode::MemoryBudgetExceeded);
        assert_eq!(err.code().category(), "Memory");
    }

    #[test]
    fn test_error_display() {
        let err = CorvusError::NegativeSubstringLength { length: -3 };
        assert_eq!(err.to_string(), "negative substring length -3 not allowed");
    }

    #[test]
    fn test_classification() {
        assert!(CorvusError::Cancelled.is_expected());
        assert!(CorvusError::NegativeSubstringLength { length: -1 }.is_expected());
        assert!(CorvusError::TypeMismatch {
            expected: PhysType::Int64,
            actual: PhysType::Bytes,
        }
        .is_internal());
        assert!(CorvusError::internal("broken invariant").is_internal());
    }

    #[test]
    fn test_internal_carries_origin() {
        let err = CorvusError::internal("boom");
        let text = err.to_string();
        assert!(text.contains("boom"));
        assert!(text.contains("engine.rs"), "origin missing: {text}");
    }

    #[test]
    fn test_unsupported_kernel_types_display() {
        let err = CorvusError::UnsupportedKernelTypes {
            kernel: "substring",
            start: PhysType::Bool,
            length: PhysType::Int16,
        };
        assert_eq!(
            err.to_string(),
            "unsupported substring argument types: BOOL INT2"
        );
    }
}

//! Physical column types.
//!
//! A `PhysType` describes the in-memory representation of one column as
//! seen by the vectorized execution engine: a fixed integer width, a
//! boolean, or variable-width bytes. Kernel dispatch keys off these
//! declarations once at operator construction, never per row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The physical type of a column vector.
///
/// # Example
///
/// ```rust
/// use corvus_common::types::PhysType;
///
/// assert_eq!(PhysType::Int32.fixed_size(), Some(4));
/// assert_eq!(PhysType::Bytes.fixed_size(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysType {
    /// Boolean value.
    Bool,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Variable-width byte string.
    Bytes,
}

impl PhysType {
    /// Returns the size in bytes of one value, or `None` for
    /// variable-width types.
    #[inline]
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool => Some(1),
            Self::Int16 => Some(2),
            Self::Int32 => Some(4),
            Self::Int64 => Some(8),
            Self::Bytes => None,
        }
    }

    /// Returns true if this is one of the fixed-width integer types.
    #[inline]
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns the integer width in bits, or `None` for non-integer types.
    #[inline]
    #[must_use]
    pub const fn integer_width(self) -> Option<u8> {
        match self {
            Self::Int16 => Some(16),
            Self::Int32 => Some(32),
            Self::Int64 => Some(64),
            Self::Bool | Self::Bytes => None,
        }
    }
}

impl fmt::Display for PhysType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "BOOL",
            Self::Int16 => "INT2",
            Self::Int32 => "INT4",
            Self::Int64 => "INT8",
            Self::Bytes => "BYTES",
        };
        write!(f, "{name}")
    }
}

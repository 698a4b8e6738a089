//! Error handling for CorvusDB.
//!
//! This module provides a unified error type and result alias used
//! across the CorvusDB execution components.

mod engine;

pub use engine::{CorvusError, ErrorClass, ErrorCode};

/// Result type alias for CorvusDB operations.
pub type CorvusResult<T> = std::result::Result<T, CorvusError>;

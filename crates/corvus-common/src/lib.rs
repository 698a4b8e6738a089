//! # corvus-common
//!
//! Common types, errors, and utilities for CorvusDB.
//!
//! This crate provides the foundational types and abstractions shared by
//! the CorvusDB execution components. It includes:
//!
//! - **Types**: physical column types declared by the query planner
//! - **Errors**: unified error handling with `CorvusError` and its
//!   expected/internal classification
//! - **Config**: execution engine configuration structures
//! - **Constants**: system-wide constants and limits
//! - **Callsite**: a process-wide cache for resolving diagnostic code
//!   locations to workspace-relative paths
//!
//! ## Example
//!
//! ```rust
//! use corvus_common::error::CorvusResult;
//! use corvus_common::types::PhysType;
//!
//! fn example() -> CorvusResult<()> {
//!     let ty = PhysType::Int64;
//!     assert!(ty.is_integer());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod callsite;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use error::{CorvusError, CorvusResult, ErrorClass};
pub use types::PhysType;

//! Core type declarations shared between the planner and the execution
//! engine.
//!
//! The planner fixes the physical type of every column before the first
//! batch is pulled; the execution engine trusts these declarations and
//! treats any runtime mismatch as an internal error.

mod columns;

pub use columns::PhysType;

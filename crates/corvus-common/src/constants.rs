//! System-wide constants for the CorvusDB execution engine.
//!
//! This module defines constants used across the execution components.
//! These values are carefully chosen for cache friendliness and low
//! per-batch overhead.

// =============================================================================
// Batch Sizing Constants
// =============================================================================

/// Default number of rows in an execution batch (1024).
///
/// Large enough to amortize per-batch overhead across many rows, small
/// enough that a batch of fixed-width columns stays cache resident.
pub const DEFAULT_BATCH_CAPACITY: usize = 1024;

/// Maximum number of rows in an execution batch (4096).
pub const MAX_BATCH_CAPACITY: usize = 4096;

// =============================================================================
// Memory Budget Constants
// =============================================================================

/// Default per-query memory budget in bytes (64 MB).
pub const DEFAULT_MEMORY_BUDGET: usize = 64 * 1024 * 1024;

/// Minimum per-query memory budget in bytes (64 KB).
///
/// A budget below this cannot hold even a single batch of modest width
/// and would fail every query immediately.
pub const MIN_MEMORY_BUDGET: usize = 64 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_capacity_bounds() {
        assert!(DEFAULT_BATCH_CAPACITY <= MAX_BATCH_CAPACITY);
        assert!(DEFAULT_BATCH_CAPACITY.is_power_of_two());
    }

    #[test]
    fn test_memory_budget_bounds() {
        assert!(MIN_MEMORY_BUDGET <= DEFAULT_MEMORY_BUDGET);
    }
}

//! Execution engine configuration structures.
//!
//! These structures define the configurable aspects of one query's
//! execution pipelines. The server constructs one `ExecConfig` per query
//! from session settings and cluster defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_CAPACITY, DEFAULT_MEMORY_BUDGET, MAX_BATCH_CAPACITY, MIN_MEMORY_BUDGET,
};
use crate::error::{CorvusError, CorvusResult};

/// Execution engine configuration.
///
/// # Example
///
/// ```rust
/// use corvus_common::config::ExecConfig;
///
/// let config = ExecConfig::default();
/// assert_eq!(config.batch_capacity, 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    /// Maximum number of rows served per batch.
    /// Default: 1024
    pub batch_capacity: usize,

    /// Per-query memory budget in bytes enforced by the allocator ledger.
    /// Default: 67108864 (64 MB)
    pub memory_budget_bytes: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET,
        }
    }
}

impl ExecConfig {
    /// Creates a minimal configuration for testing.
    ///
    /// Uses a small batch capacity so tests exercise multi-batch
    /// pipelines with little data, and a small budget so exhaustion is
    /// easy to provoke.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            batch_capacity: 4,
            memory_budget_bytes: MIN_MEMORY_BUDGET,
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> CorvusResult<()> {
        if self.batch_capacity == 0 {
            return Err(CorvusError::invalid_config("batch_capacity must be nonzero"));
        }

        if self.batch_capacity > MAX_BATCH_CAPACITY {
            return Err(CorvusError::invalid_config(format!(
                "batch_capacity {} exceeds maximum {}",
                self.batch_capacity, MAX_BATCH_CAPACITY
            )));
        }

        if self.memory_budget_bytes < MIN_MEMORY_BUDGET {
            return Err(CorvusError::invalid_config(format!(
                "memory_budget_bytes must be at least {MIN_MEMORY_BUDGET} bytes"
            )));
        }

        Ok(())
    }
}

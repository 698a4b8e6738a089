//! Memory accounting for execution pipelines.
//!
//! Every byte a pipeline's vectors hold is charged against a per-query
//! ledger before the query may keep it. The ledger is a running total:
//! growth charges it, release refunds it, and a request that would push
//! the total past the configured budget fails with an expected error so
//! the query can fail cleanly instead of growing without bound.
//!
//! Kernels do not account for individual writes. They wrap the unit of
//! work that populates their output vectors in
//! [`Allocator::perform_operation`], which observes the net growth across
//! the closure and settles it against the ledger afterwards.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use corvus_common::config::ExecConfig;
use corvus_common::error::{CorvusError, CorvusResult};
use corvus_common::types::PhysType;

use crate::batch::Batch;
use crate::vector::Vector;

/// A query-scoped byte ledger enforcing a memory budget.
///
/// Shared by every allocator handle of one query's pipelines; the total
/// never goes negative and always equals the sum of net charges.
pub struct MemoryAccount {
    /// Bytes currently charged.
    used: AtomicUsize,
    /// The budget in bytes.
    budget: usize,
}

impl MemoryAccount {
    /// Creates an account with the given budget in bytes.
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self {
            used: AtomicUsize::new(0),
            budget,
        }
    }

    /// Returns the bytes currently charged.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Returns the configured budget.
    #[inline]
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Charges `bytes` against the budget.
    ///
    /// On success the ledger grows by exactly `bytes`. When the request
    /// would exceed the budget the ledger is left untouched and an
    /// expected error is returned; charges made before the failing
    /// request remain accounted until the query tears down.
    pub fn grow(&self, bytes: usize) -> CorvusResult<()> {
        let result = self
            .used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                let total = used.checked_add(bytes)?;
                (total <= self.budget).then_some(total)
            });

        match result {
            Ok(_) => Ok(()),
            Err(used) => {
                tracing::warn!(
                    requested = bytes,
                    used,
                    budget = self.budget,
                    "memory budget exceeded"
                );
                Err(CorvusError::MemoryBudgetExceeded {
                    requested: bytes,
                    used,
                    budget: self.budget,
                })
            }
        }
    }

    /// Refunds `bytes` to the budget, saturating at zero.
    pub fn shrink(&self, bytes: usize) {
        let result = self
            .used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                Some(used.saturating_sub(bytes))
            });
        // The closure never returns None.
        let _ = result;
    }
}

impl fmt::Debug for MemoryAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAccount")
            .field("used", &self.used())
            .field("budget", &self.budget)
            .finish()
    }
}

/// An operator's handle on its query's [`MemoryAccount`].
///
/// Handles are cheap to clone; every pipeline of one query shares the
/// same underlying ledger.
#[derive(Debug, Clone)]
pub struct Allocator {
    account: Arc<MemoryAccount>,
}

impl Allocator {
    /// Creates an allocator over an existing account.
    #[must_use]
    pub fn new(account: Arc<MemoryAccount>) -> Self {
        Self { account }
    }

    /// Creates an allocator with a fresh account of the given budget.
    #[must_use]
    pub fn with_budget(budget: usize) -> Self {
        Self::new(Arc::new(MemoryAccount::new(budget)))
    }

    /// Creates an allocator budgeted per the execution configuration.
    #[must_use]
    pub fn for_config(config: &ExecConfig) -> Self {
        Self::with_budget(config.memory_budget_bytes)
    }

    /// Returns the underlying account.
    #[inline]
    #[must_use]
    pub fn account(&self) -> &Arc<MemoryAccount> {
        &self.account
    }

    /// Allocates a batch for `types` at `capacity` rows, charging its
    /// initial footprint.
    pub fn new_batch(&self, types: &[PhysType], capacity: usize) -> CorvusResult<Batch> {
        let batch = Batch::with_capacity(types, capacity);
        self.account.grow(batch.allocated_bytes())?;
        Ok(batch)
    }

    /// Runs `op` over the vectors it is about to mutate and settles the
    /// net storage growth against the ledger.
    ///
    /// The closure's writes are not accounted individually; only the
    /// difference in allocated bytes across the whole unit of work is
    /// charged (or refunded). Growth that cannot be charged surfaces as
    /// the budget error, unless the operation itself already failed, in
    /// which case the operation's error wins and whatever growth did
    /// occur is still settled so the ledger matches live storage.
    pub fn perform_operation<T>(
        &self,
        vectors: &mut [&mut Vector],
        op: impl FnOnce(&mut [&mut Vector]) -> CorvusResult<T>,
    ) -> CorvusResult<T> {
        let before: usize = vectors.iter().map(|v| v.allocated_bytes()).sum();
        let result = op(vectors);
        let after: usize = vectors.iter().map(|v| v.allocated_bytes()).sum();

        if after > before {
            if let Err(budget_err) = self.account.grow(after - before) {
                return Err(match result {
                    Err(op_err) => op_err,
                    Ok(_) => budget_err,
                });
            }
        } else if before > after {
            self.account.shrink(before - after);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_within_budget() {
        let account = MemoryAccount::new(1024);
        account.grow(512).unwrap();
        account.grow(512).unwrap();
        assert_eq!(account.used(), 1024);
    }

    #[test]
    fn test_grow_beyond_budget_leaves_ledger_intact() {
        let account = MemoryAccount::new(1000);
        account.grow(400).unwrap();

        let err = account.grow(700).unwrap_err();
        assert!(err.is_expected());
        assert!(matches!(
            err,
            CorvusError::MemoryBudgetExceeded {
                requested: 700,
                used: 400,
                budget: 1000,
            }
        ));
        // The failed request must not drop or double prior charges.
        assert_eq!(account.used(), 400);
    }

    #[test]
    fn test_shrink_never_goes_negative() {
        let account = MemoryAccount::new(1000);
        account.grow(100).unwrap();
        account.shrink(5000);
        assert_eq!(account.used(), 0);
        account.grow(1000).unwrap();
    }

    #[test]
    fn test_ledger_conservation() {
        let account = MemoryAccount::new(10_000);
        let mut expected = 0usize;
        for (grow, shrink) in [(100, 40), (2000, 2000), (5, 0), (300, 299)] {
            account.grow(grow).unwrap();
            account.shrink(shrink);
            expected = expected + grow - shrink;
            assert_eq!(account.used(), expected);
        }
    }

    #[test]
    fn test_new_batch_charges_footprint() {
        let allocator = Allocator::with_budget(1 << 20);
        let batch = allocator
            .new_batch(&[PhysType::Int64, PhysType::Bytes], 64)
            .unwrap();
        assert_eq!(allocator.account().used(), batch.allocated_bytes());
    }

    #[test]
    fn test_new_batch_over_budget_fails() {
        let allocator = Allocator::with_budget(16);
        let err = allocator
            .new_batch(&[PhysType::Int64], 1024)
            .unwrap_err();
        assert!(err.is_expected());
        assert_eq!(allocator.account().used(), 0);
    }

    #[test]
    fn test_perform_operation_charges_net_growth() {
        let allocator = Allocator::with_budget(1 << 20);
        let mut vector = Vector::with_capacity(PhysType::Bytes, 4);
        let before = vector.allocated_bytes();
        allocator.account().grow(before).unwrap();

        allocator
            .perform_operation(&mut [&mut vector], |vectors| {
                let store = vectors[0].bytes_mut()?;
                store.set(0, &[0xAB; 4096]);
                Ok(())
            })
            .unwrap();

        assert_eq!(allocator.account().used(), vector.allocated_bytes());
        assert!(vector.allocated_bytes() > before);
    }

    #[test]
    fn test_perform_operation_settles_growth_on_op_error() {
        let allocator = Allocator::with_budget(1 << 20);
        let mut vector = Vector::with_capacity(PhysType::Bytes, 4);
        allocator.account().grow(vector.allocated_bytes()).unwrap();

        let err = allocator
            .perform_operation(&mut [&mut vector], |vectors| {
                let store = vectors[0].bytes_mut()?;
                store.set(0, &[0xCD; 2048]);
                Err::<(), _>(CorvusError::NegativeSubstringLength { length: -1 })
            })
            .unwrap_err();

        assert!(err.is_expected());
        // The partial growth stays accounted; the ledger matches storage.
        assert_eq!(allocator.account().used(), vector.allocated_bytes());
    }

    #[test]
    fn test_perform_operation_budget_error_is_expected() {
        let allocator = Allocator::with_budget(64);
        let mut vector = Vector::with_capacity(PhysType::Bytes, 1);

        let err = allocator
            .perform_operation(&mut [&mut vector], |vectors| {
                let store = vectors[0].bytes_mut()?;
                store.set(0, &[0u8; 4096]);
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, CorvusError::MemoryBudgetExceeded { .. }));
    }
}

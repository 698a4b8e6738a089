//! Pipeline boundary: driving a pull chain to completion.
//!
//! An operator tree executes as a single-threaded, synchronous call
//! chain driven by its consumer. The runner here is that consumer: it
//! pulls from the root until the end marker, checks the cooperative
//! cancellation token between pulls, and is the one place where error
//! classification is interpreted: expected errors become query
//! failures, internal errors are logged as engine bugs before they
//! propagate. Aborting the process on an internal error is the duty of
//! the embedding server; the engine itself is a library and only
//! guarantees the error reaches the server classified and logged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use corvus_common::error::{CorvusError, CorvusResult, ErrorClass};

use crate::batch::Batch;
use crate::operator::Operator;

/// A cooperative cancellation signal shared with the query's owner.
///
/// Kernels never poll this; the runner checks it between pulls, so a
/// cancellation takes effect at the next batch boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true if cancellation has been requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Counters describing a drained pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Logical rows produced by the root operator.
    pub rows: usize,
    /// Nonempty batches produced by the root operator.
    pub batches: usize,
}

/// Drives one pipeline from its root operator.
#[derive(Debug)]
pub struct PipelineRunner {
    root: Box<dyn Operator>,
    cancel: CancelToken,
}

impl PipelineRunner {
    /// Creates a runner over the root of an operator tree.
    #[must_use]
    pub fn new(root: Box<dyn Operator>, cancel: CancelToken) -> Self {
        Self { root, cancel }
    }

    /// Drains the pipeline, discarding batches.
    pub fn run(&mut self) -> CorvusResult<QueryOutcome> {
        self.run_with(|_| Ok(()))
    }

    /// Drains the pipeline, handing each nonempty batch to `on_batch`.
    ///
    /// The callback must copy out anything it needs: the batch's backing
    /// storage is reused by the next pull.
    pub fn run_with(
        &mut self,
        mut on_batch: impl FnMut(&Batch) -> CorvusResult<()>,
    ) -> CorvusResult<QueryOutcome> {
        let mut outcome = QueryOutcome::default();
        loop {
            if self.cancel.is_cancelled() {
                return Err(Self::classify(CorvusError::Cancelled));
            }

            let batch = match self.root.next() {
                Ok(batch) => batch,
                Err(err) => return Err(Self::classify(err)),
            };
            if batch.is_empty() {
                break;
            }

            outcome.rows += batch.len();
            outcome.batches += 1;
            if let Err(err) = on_batch(batch) {
                return Err(Self::classify(err));
            }
        }

        tracing::debug!(
            rows = outcome.rows,
            batches = outcome.batches,
            "pipeline drained"
        );
        Ok(outcome)
    }

    /// Interprets an error's classification at the boundary.
    fn classify(err: CorvusError) -> CorvusError {
        match err.class() {
            ErrorClass::Internal => {
                tracing::error!(
                    error = %err,
                    code = %err.code(),
                    "internal execution error; query must abort"
                );
            }
            ErrorClass::Expected => {
                tracing::debug!(error = %err, "query failed");
            }
        }
        err
    }
}

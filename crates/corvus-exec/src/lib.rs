//! # corvus-exec
//!
//! The vectorized query execution engine for CorvusDB.
//!
//! This crate evaluates relational operators over columnar data in
//! fixed-size batches. It consists of:
//!
//! - **Batch/Vector model**: typed column vectors with null bitmaps,
//!   grouped into batches with optional selection lists
//! - **Allocator**: per-query byte accounting enforcing a memory budget
//! - **Operators**: pull-based pipeline stages (leaf sources, filters,
//!   projections, scalar-function kernels)
//! - **Kernels**: row loops specialized at construction time to the
//!   declared value widths of their argument columns
//! - **Pipeline runner**: the boundary that drives a pipeline, checks
//!   cancellation, and interprets error classification
//!
//! # Execution Model
//!
//! Operators use a pull-based model: each call to [`Operator::next`]
//! returns one complete batch, and a zero-length batch signals
//! exhaustion. Batches borrow from their producer and are reused across
//! pulls.
//!
//! ```ignore
//! let mut runner = PipelineRunner::new(root, CancelToken::new());
//! let outcome = runner.run_with(|batch| {
//!     println!("got {} rows", batch.len());
//!     Ok(())
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod alloc;
mod batch;
mod bytes;
mod filter;
mod kernels;
mod nulls;
mod operator;
mod pipeline;
mod project;
mod source;
mod vector;

pub use alloc::{Allocator, MemoryAccount};
pub use batch::Batch;
pub use bytes::ByteStore;
pub use filter::BoolColumnFilter;
pub use kernels::new_substring_operator;
pub use nulls::NullBitmap;
pub use operator::{OneInput, Operator};
pub use pipeline::{CancelToken, PipelineRunner, QueryOutcome};
pub use project::SimpleProject;
pub use source::ColumnarSource;
pub use vector::{ColumnData, FixedInt, Vector};

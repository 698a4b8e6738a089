//! Type-specialized kernels.
//!
//! A kernel is the row-processing implementation of one logical
//! operation, specialized to the concrete value widths of its argument
//! columns. Specialization happens once, at operator construction: the
//! declared types are inspected against a fixed decision table and a
//! monomorphized implementation is bound for the operator's lifetime.
//! An argument type combination with no table entry is an engine bug
//! and is rejected at construction, never at row-processing time.
//!
//! Every kernel honors the same per-row obligations:
//!
//! - resolve the selection list (`row = sel[i]`) instead of iterating
//!   physical rows directly;
//! - propagate NULL all-or-nothing across the argument columns;
//! - clear stale NULL markers on reused output storage before writing;
//! - charge output growth through the allocator.

mod substring;

pub use substring::new_substring_operator;

//! Execution batches.
//!
//! A `Batch` is an ordered, bounded collection of parallel column vectors
//! sharing one logical row count and an optional selection list. Batches
//! are transient: a producer reuses its batch's backing storage on the
//! next pull, so the pull protocol hands them out as `&mut Batch` and the
//! borrow checker keeps consumers from retaining one across pulls.
//!
//! # Selection lists
//!
//! When a selection list is present it defines both the order and the
//! subset of physical rows that are logically visible, and the logical
//! length equals the list's length. Every consumer must resolve
//! `row = sel[i]` in that case and `row = i` otherwise; skipping this
//! indirection silently processes filtered-out rows.

use corvus_common::error::{CorvusError, CorvusResult};
use corvus_common::types::PhysType;

use crate::vector::Vector;

/// A batch of parallel column vectors.
#[derive(Debug)]
pub struct Batch {
    /// Physical row capacity shared by all columns.
    capacity: usize,
    /// Logical row count; with a selection list this equals its length.
    length: usize,
    /// Ordered physical row indices of the logically active rows.
    selection: Option<Vec<usize>>,
    /// The column vectors.
    columns: Vec<Vector>,
}

impl Batch {
    /// Creates a batch whose columns match `types`, each sized for
    /// `capacity` rows.
    #[must_use]
    pub fn with_capacity(types: &[PhysType], capacity: usize) -> Self {
        let columns = types
            .iter()
            .map(|&phys| Vector::with_capacity(phys, capacity))
            .collect();
        Self {
            capacity,
            length: 0,
            selection: None,
            columns,
        }
    }

    /// Returns the logical row count.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the batch carries no logical rows.
    ///
    /// A zero-length batch returned from a pull is the end marker.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Sets the logical row count.
    pub fn set_len(&mut self, length: usize) {
        assert!(length <= self.capacity, "length exceeds batch capacity");
        self.length = length;
    }

    /// Returns the physical row capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of columns.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns the selection list, if present.
    #[inline]
    #[must_use]
    pub fn selection(&self) -> Option<&[usize]> {
        self.selection.as_deref()
    }

    /// Installs (or removes) the selection list, returning the previous
    /// one so its storage can be reused.
    pub fn replace_selection(&mut self, selection: Option<Vec<usize>>) -> Option<Vec<usize>> {
        std::mem::replace(&mut self.selection, selection)
    }

    /// Returns the column at `index`.
    pub fn column(&self, index: usize) -> CorvusResult<&Vector> {
        self.columns.get(index).ok_or(CorvusError::ColumnOutOfRange {
            index,
            width: self.columns.len(),
        })
    }

    /// Returns the column at `index` for mutation.
    pub fn column_mut(&mut self, index: usize) -> CorvusResult<&mut Vector> {
        let width = self.columns.len();
        self.columns
            .get_mut(index)
            .ok_or(CorvusError::ColumnOutOfRange { index, width })
    }

    /// Returns all columns for mutation.
    #[inline]
    pub fn columns_mut(&mut self) -> &mut [Vector] {
        &mut self.columns
    }

    /// Removes the column at `index`, leaving a placeholder.
    ///
    /// Kernels writing one column while reading others take the output
    /// column out, operate, and put it back with [`Batch::restore_column`]
    /// on every path out of the kernel, including error paths.
    pub fn take_column(&mut self, index: usize) -> CorvusResult<Vector> {
        let width = self.columns.len();
        match self.columns.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, Vector::placeholder())),
            None => Err(CorvusError::ColumnOutOfRange { index, width }),
        }
    }

    /// Puts back a column removed by [`Batch::take_column`].
    pub fn restore_column(&mut self, index: usize, vector: Vector) {
        self.columns[index] = vector;
    }

    /// Returns the heap bytes backing this batch.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        let columns: usize = self.columns.iter().map(Vector::allocated_bytes).sum();
        let selection = self
            .selection
            .as_ref()
            .map_or(0, |sel| sel.capacity() * std::mem::size_of::<usize>());
        columns + selection
    }
}

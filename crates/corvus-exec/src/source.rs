//! Leaf operator serving engine-owned columnar data.
//!
//! `ColumnarSource` is the bottom of a pipeline: it owns a set of column
//! vectors (for example rows decoded from the storage layer) and serves
//! them in fixed-capacity batches, reusing one output batch across
//! pulls. The batch schema may declare more columns than the source
//! data carries; the extra columns are scratch space for downstream
//! operators' outputs, sized and charged when the source is built.

use corvus_common::error::{CorvusError, CorvusResult};
use corvus_common::types::PhysType;

use crate::alloc::Allocator;
use crate::batch::Batch;
use crate::operator::Operator;
use crate::vector::Vector;

/// A leaf operator over in-memory columns.
#[derive(Debug)]
pub struct ColumnarSource {
    /// The source columns, each holding `rows` physical rows.
    data: Vec<Vector>,
    /// Total rows to serve.
    rows: usize,
    /// Next row to serve.
    cursor: usize,
    /// Reusable output batch.
    batch: Batch,
}

impl ColumnarSource {
    /// Creates a source over `columns`, each of which must hold at least
    /// `rows` rows. `extra_types` declares the output-slot columns
    /// appended after the data columns in the batch schema.
    pub fn new(
        allocator: &Allocator,
        columns: Vec<Vector>,
        rows: usize,
        extra_types: &[PhysType],
        batch_capacity: usize,
    ) -> CorvusResult<Self> {
        for (index, column) in columns.iter().enumerate() {
            if column.capacity() < rows {
                return Err(CorvusError::internal(format!(
                    "source column {index} holds {} rows, need {rows}",
                    column.capacity()
                )));
            }
        }

        let schema: Vec<PhysType> = columns
            .iter()
            .map(Vector::phys)
            .chain(extra_types.iter().copied())
            .collect();
        let batch = allocator.new_batch(&schema, batch_capacity)?;

        Ok(Self {
            data: columns,
            rows,
            cursor: 0,
            batch,
        })
    }
}

impl Operator for ColumnarSource {
    fn next(&mut self) -> CorvusResult<&mut Batch> {
        let count = (self.rows - self.cursor).min(self.batch.capacity());
        if count == 0 {
            self.batch.set_len(0);
            return Ok(&mut self.batch);
        }

        let _ = self.batch.replace_selection(None);
        for (index, column) in self.data.iter().enumerate() {
            self.batch
                .column_mut(index)?
                .copy_range_from(column, self.cursor, count)?;
        }
        // The scratch columns may still carry NULL markers from the rows
        // previously occupying this storage.
        for index in self.data.len()..self.batch.width() {
            self.batch.column_mut(index)?.nulls_mut().clear();
        }

        self.batch.set_len(count);
        self.cursor += count;
        Ok(&mut self.batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source(rows: usize, batch_capacity: usize) -> ColumnarSource {
        let allocator = Allocator::with_budget(1 << 20);
        let values: Vec<Option<i64>> = (0..rows as i64).map(Some).collect();
        ColumnarSource::new(
            &allocator,
            vec![Vector::from_int64_values(&values)],
            rows,
            &[PhysType::Bytes],
            batch_capacity,
        )
        .unwrap()
    }

    #[test]
    fn test_serves_fixed_capacity_batches() {
        let mut source = test_source(10, 4);

        let sizes: Vec<usize> = (0..3)
            .map(|_| source.next().unwrap().len())
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        let mut source = test_source(3, 4);
        assert_eq!(source.next().unwrap().len(), 3);
        assert_eq!(source.next().unwrap().len(), 0);
        assert_eq!(source.next().unwrap().len(), 0);
    }

    #[test]
    fn test_batches_carry_copied_values() {
        let mut source = test_source(6, 4);

        let batch = source.next().unwrap();
        assert_eq!(batch.column(0).unwrap().fixed::<i64>().unwrap()[3], 3);

        let batch = source.next().unwrap();
        assert_eq!(batch.column(0).unwrap().fixed::<i64>().unwrap()[0], 4);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_short_source_column_rejected() {
        let allocator = Allocator::with_budget(1 << 20);
        let err = ColumnarSource::new(
            &allocator,
            vec![Vector::from_int64_values(&[Some(1)])],
            5,
            &[],
            4,
        )
        .unwrap_err();
        assert!(err.is_internal());
    }
}

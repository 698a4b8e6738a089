//! Simple column projection.
//!
//! `SimpleProject` presents a subset (or reordering) of the child's
//! columns. The projected batch is owned by the operator and reused
//! across pulls; selected rows are materialized densely in selection
//! order, so the output carries no selection list. Column growth in the
//! output (bytes columns in particular) is charged through the
//! allocator like any other kernel output.

use corvus_common::error::CorvusResult;
use corvus_common::types::PhysType;

use crate::alloc::Allocator;
use crate::batch::Batch;
use crate::operator::Operator;
use crate::vector::Vector;

/// Projects a fixed set of child columns, in order.
#[derive(Debug)]
pub struct SimpleProject {
    /// The upstream operator.
    input: Box<dyn Operator>,
    /// Allocator charging output growth.
    allocator: Allocator,
    /// Child column index for each output column.
    projection: Vec<usize>,
    /// Reusable output batch.
    out: Batch,
}

impl SimpleProject {
    /// Creates a projection of the child columns named by `projection`.
    ///
    /// `child_types` is the child's batch schema as declared by the
    /// planner; the output schema is the projected slice of it.
    pub fn new(
        allocator: Allocator,
        input: Box<dyn Operator>,
        child_types: &[PhysType],
        projection: Vec<usize>,
        batch_capacity: usize,
    ) -> CorvusResult<Self> {
        let mut out_types = Vec::with_capacity(projection.len());
        for &index in &projection {
            match child_types.get(index) {
                Some(&phys) => out_types.push(phys),
                None => {
                    return Err(corvus_common::CorvusError::ColumnOutOfRange {
                        index,
                        width: child_types.len(),
                    })
                }
            }
        }
        let out = allocator.new_batch(&out_types, batch_capacity)?;
        Ok(Self {
            input,
            allocator,
            projection,
            out,
        })
    }
}

impl Operator for SimpleProject {
    fn next(&mut self) -> CorvusResult<&mut Batch> {
        let batch = self.input.next()?;
        let n = batch.len();
        if n == 0 {
            self.out.set_len(0);
            return Ok(&mut self.out);
        }

        let projection = &self.projection;
        {
            let batch_ref: &Batch = batch;
            let mut columns: Vec<&mut Vector> = self.out.columns_mut().iter_mut().collect();
            self.allocator.perform_operation(&mut columns, |vectors| {
                for (out_idx, vector) in vectors.iter_mut().enumerate() {
                    let source = batch_ref.column(projection[out_idx])?;
                    vector.copy_logical_rows_from(source, batch_ref.selection(), n)?;
                }
                Ok(())
            })?;
        }

        let _ = self.out.replace_selection(None);
        self.out.set_len(n);
        Ok(&mut self.out)
    }
}

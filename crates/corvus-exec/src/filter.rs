//! Selection-producing filter over a boolean column.
//!
//! `BoolColumnFilter` turns a boolean column into the batch's selection
//! list: rows whose value is true and not NULL stay logically visible,
//! everything else disappears without moving any data. An existing
//! selection list composes: the filter reads rows through it and the
//! new list is a subset of the old one, in the same order.

use corvus_common::error::CorvusResult;

use crate::batch::Batch;
use crate::operator::Operator;

/// Filters a batch down to the rows where a boolean column is true.
#[derive(Debug)]
pub struct BoolColumnFilter {
    /// The upstream operator.
    input: Box<dyn Operator>,
    /// Index of the boolean column to filter on.
    column: usize,
    /// Reusable selection storage handed back by the batch each pull.
    storage: Vec<usize>,
}

impl BoolColumnFilter {
    /// Creates a filter on `column` of the child's batches.
    #[must_use]
    pub fn new(input: Box<dyn Operator>, column: usize) -> Self {
        Self {
            input,
            column,
            storage: Vec::new(),
        }
    }
}

impl Operator for BoolColumnFilter {
    fn next(&mut self) -> CorvusResult<&mut Batch> {
        // A batch whose every row is filtered out is not the end of the
        // stream, so keep pulling until rows survive or the child is
        // exhausted.
        loop {
            let batch = self.input.next()?;
            let n = batch.len();
            if n > 0 {
                let mut sel = std::mem::take(&mut self.storage);
                sel.clear();
                {
                    let values = batch.column(self.column)?.bools()?;
                    let nulls = batch.column(self.column)?.nulls();
                    let old_sel = batch.selection();
                    for i in 0..n {
                        let row = old_sel.map_or(i, |s| s[i]);
                        if !nulls.is_null(row) && values[row] {
                            sel.push(row);
                        }
                    }
                }
                let kept = sel.len();
                if let Some(old) = batch.replace_selection(Some(sel)) {
                    self.storage = old;
                }
                batch.set_len(kept);
            }

            if batch.is_empty() && n > 0 {
                // Every row was filtered out; pull the next batch.
                continue;
            }

            // SAFETY: decouples the returned reference from the loop's
            // borrow region, which the current borrow checker cannot see
            // ends on the other path. The batch lives inside the child
            // operator, which outlives `self`'s borrow.
            let batch: *mut Batch = batch;
            return Ok(unsafe { &mut *batch });
        }
    }
}

//! The SQL `substring(source, start, length)` kernel family.
//!
//! One specialization exists per combination of start and length integer
//! widths; the generic body below monomorphizes into each of the nine
//! variants the dispatch table can select. Start positions are 1-indexed
//! per SQL convention, a negative length is a user error, and the bounds
//! policy clamps out-of-range requests to the source value instead of
//! failing them.

use std::marker::PhantomData;

use corvus_common::error::{CorvusError, CorvusResult};
use corvus_common::types::PhysType;

use crate::alloc::Allocator;
use crate::batch::Batch;
use crate::operator::{OneInput, Operator};
use crate::vector::FixedInt;

/// Builds a substring operator specialized to the declared widths of the
/// start and length argument columns.
///
/// `column_types` is the batch schema; `argument_cols` names the source,
/// start, and length columns in that order, and `output_idx` names the
/// bytes column receiving the result. Non-integer start or length types
/// and non-bytes source or output types are engine bugs.
pub fn new_substring_operator(
    allocator: Allocator,
    column_types: &[PhysType],
    argument_cols: [usize; 3],
    output_idx: usize,
    input: Box<dyn Operator>,
) -> CorvusResult<Box<dyn Operator>> {
    let column = |index: usize| -> CorvusResult<PhysType> {
        column_types
            .get(index)
            .copied()
            .ok_or(CorvusError::ColumnOutOfRange {
                index,
                width: column_types.len(),
            })
    };

    let source_type = column(argument_cols[0])?;
    let start_type = column(argument_cols[1])?;
    let length_type = column(argument_cols[2])?;
    let output_type = column(output_idx)?;

    if source_type != PhysType::Bytes {
        return Err(CorvusError::internal(format!(
            "non-bytes substring source argument type {source_type}"
        )));
    }
    if output_type != PhysType::Bytes {
        return Err(CorvusError::internal(format!(
            "non-bytes substring output column type {output_type}"
        )));
    }
    if !start_type.is_integer() {
        return Err(CorvusError::internal(format!(
            "non-int start argument type {start_type}"
        )));
    }
    if !length_type.is_integer() {
        return Err(CorvusError::internal(format!(
            "non-int length argument type {length_type}"
        )));
    }

    macro_rules! specialize {
        ($start:ty, $length:ty) => {
            Ok(Box::new(SubstringOp::<$start, $length>::new(
                allocator,
                argument_cols,
                output_idx,
                input,
            )) as Box<dyn Operator>)
        };
    }

    match (start_type, length_type) {
        (PhysType::Int16, PhysType::Int16) => specialize!(i16, i16),
        (PhysType::Int16, PhysType::Int32) => specialize!(i16, i32),
        (PhysType::Int16, PhysType::Int64) => specialize!(i16, i64),
        (PhysType::Int32, PhysType::Int16) => specialize!(i32, i16),
        (PhysType::Int32, PhysType::Int32) => specialize!(i32, i32),
        (PhysType::Int32, PhysType::Int64) => specialize!(i32, i64),
        (PhysType::Int64, PhysType::Int16) => specialize!(i64, i16),
        (PhysType::Int64, PhysType::Int32) => specialize!(i64, i32),
        (PhysType::Int64, PhysType::Int64) => specialize!(i64, i64),
        _ => Err(CorvusError::UnsupportedKernelTypes {
            kernel: "substring",
            start: start_type,
            length: length_type,
        }),
    }
}

/// One width-specialized substring operator.
#[derive(Debug)]
struct SubstringOp<S, L> {
    one: OneInput,
    allocator: Allocator,
    argument_cols: [usize; 3],
    output_idx: usize,
    _widths: PhantomData<fn(S, L)>,
}

impl<S: FixedInt, L: FixedInt> SubstringOp<S, L> {
    fn new(
        allocator: Allocator,
        argument_cols: [usize; 3],
        output_idx: usize,
        input: Box<dyn Operator>,
    ) -> Self {
        Self {
            one: OneInput::new(input),
            allocator,
            argument_cols,
            output_idx,
            _widths: PhantomData,
        }
    }
}

impl<S: FixedInt, L: FixedInt> Operator for SubstringOp<S, L> {
    fn next(&mut self) -> CorvusResult<&mut Batch> {
        let batch = self.one.input.next()?;
        let n = batch.len();
        if n == 0 {
            return Ok(batch);
        }

        let argument_cols = self.argument_cols;
        let output_idx = self.output_idx;

        let mut output = batch.take_column(output_idx)?;
        // We need to make sure that there are no leftover null values in
        // the output storage reused from a previous batch.
        if output.nulls().maybe_has_nulls() {
            output.nulls_mut().clear();
        }

        let result = {
            let batch_ref: &Batch = batch;
            self.allocator.perform_operation(&mut [&mut output], |vectors| {
                let (out_bytes, out_nulls) = vectors[0].bytes_with_nulls_mut()?;
                out_bytes.reset();

                let source_col = batch_ref.column(argument_cols[0])?;
                let source = source_col.bytes()?;
                let starts = batch_ref.column(argument_cols[1])?.fixed::<S>()?;
                let lengths = batch_ref.column(argument_cols[2])?.fixed::<L>()?;
                let arg_nulls = [
                    source_col.nulls(),
                    batch_ref.column(argument_cols[1])?.nulls(),
                    batch_ref.column(argument_cols[2])?.nulls(),
                ];
                let sel = batch_ref.selection();

                for i in 0..n {
                    let row = sel.map_or(i, |s| s[i]);

                    // The substring operation does not support nulls: if
                    // any of the arguments is NULL, the output is NULL.
                    if arg_nulls.iter().any(|nulls| nulls.is_null(row)) {
                        out_nulls.set_null(row);
                        continue;
                    }

                    let value = source.get(row);
                    let value_len = value.len() as i64;
                    // Substring start is 1-indexed.
                    let start = starts[row].widen().wrapping_sub(1);
                    let length = lengths[row].widen();
                    if length < 0 {
                        return Err(CorvusError::NegativeSubstringLength { length });
                    }

                    let mut end = start.wrapping_add(length);
                    // end < start means start + length overflowed; the
                    // wrapped sum cannot be trusted, so take the whole
                    // remaining value.
                    if end < start {
                        end = value_len;
                    } else if end < 0 {
                        end = 0;
                    } else if end > value_len {
                        end = value_len;
                    }

                    // start is clamped only after end was derived from
                    // the original start, so the two out-of-range cases
                    // do not compound.
                    let start = start.clamp(0, value_len);

                    if start < end {
                        out_bytes.set(row, &value[start as usize..end as usize]);
                    } else {
                        out_bytes.set(row, &[]);
                    }
                }
                Ok(())
            })
        };

        batch.restore_column(output_idx, output);
        result?;
        Ok(batch)
    }
}

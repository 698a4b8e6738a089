//! Typed column vectors.
//!
//! A `Vector` is a single typed column: a contiguous data buffer, a
//! physical type tag, and a null bitmap sized to the buffer's capacity.
//! Typed accessors verify the declared type once per batch and hand the
//! kernel a plain slice, keeping the per-row loop free of type checks;
//! a mismatch between a declaration and the storage it reaches is an
//! internal error, never a user error.

use corvus_common::error::{CorvusError, CorvusResult};
use corvus_common::types::PhysType;

use crate::bytes::ByteStore;
use crate::nulls::NullBitmap;

/// Typed storage for one column.
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Boolean values.
    Bool(Vec<bool>),
    /// 16-bit signed integers.
    Int16(Vec<i16>),
    /// 32-bit signed integers.
    Int32(Vec<i32>),
    /// 64-bit signed integers.
    Int64(Vec<i64>),
    /// Variable-width byte strings.
    Bytes(ByteStore),
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// A fixed-width integer type a kernel can be specialized over.
///
/// The implementors form a closed enumeration mirroring the integer
/// widths the planner may declare; kernels monomorphized over this trait
/// carry no per-row type dispatch.
pub trait FixedInt: sealed::Sealed + Copy + std::fmt::Debug + Send + Sync + 'static {
    /// The physical type tag matching this width.
    const PHYS: PhysType;

    /// Views column storage of the matching width.
    fn slice(data: &ColumnData) -> Option<&[Self]>;

    /// Mutably views column storage of the matching width.
    fn slice_mut(data: &mut ColumnData) -> Option<&mut [Self]>;

    /// Widens one value to 64 bits.
    fn widen(self) -> i64;
}

macro_rules! impl_fixed_int {
    ($ty:ty, $phys:expr, $variant:ident) => {
        impl FixedInt for $ty {
            const PHYS: PhysType = $phys;

            #[inline]
            fn slice(data: &ColumnData) -> Option<&[Self]> {
                match data {
                    ColumnData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            #[inline]
            fn slice_mut(data: &mut ColumnData) -> Option<&mut [Self]> {
                match data {
                    ColumnData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            #[inline]
            #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
            fn widen(self) -> i64 {
                self as i64
            }
        }
    };
}

impl_fixed_int!(i16, PhysType::Int16, Int16);
impl_fixed_int!(i32, PhysType::Int32, Int32);
impl_fixed_int!(i64, PhysType::Int64, Int64);

/// A single typed column with data buffer and null bitmap.
#[derive(Debug, Clone)]
pub struct Vector {
    /// Declared physical type of the stored values.
    phys: PhysType,
    /// Rows currently marked NULL; sized to the buffer capacity.
    nulls: NullBitmap,
    /// The value storage.
    data: ColumnData,
}

impl Vector {
    /// Creates a vector of `phys` with room for `capacity` rows.
    ///
    /// Fixed-width buffers are zero-filled up front so kernels may write
    /// by physical row index without growing them.
    #[must_use]
    pub fn with_capacity(phys: PhysType, capacity: usize) -> Self {
        let data = match phys {
            PhysType::Bool => ColumnData::Bool(vec![false; capacity]),
            PhysType::Int16 => ColumnData::Int16(vec![0; capacity]),
            PhysType::Int32 => ColumnData::Int32(vec![0; capacity]),
            PhysType::Int64 => ColumnData::Int64(vec![0; capacity]),
            PhysType::Bytes => ColumnData::Bytes(ByteStore::with_capacity(capacity)),
        };
        Self {
            phys,
            nulls: NullBitmap::new(capacity),
            data,
        }
    }

    /// Creates the zero-capacity stand-in left behind by
    /// [`crate::batch::Batch::take_column`].
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            phys: PhysType::Bool,
            nulls: NullBitmap::new(0),
            data: ColumnData::Bool(Vec::new()),
        }
    }

    /// Returns the declared physical type.
    #[inline]
    #[must_use]
    pub fn phys(&self) -> PhysType {
        self.phys
    }

    /// Returns the number of rows this vector can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.data {
            ColumnData::Bool(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Bytes(b) => b.capacity(),
        }
    }

    /// Returns the null bitmap.
    #[inline]
    #[must_use]
    pub fn nulls(&self) -> &NullBitmap {
        &self.nulls
    }

    /// Returns the null bitmap for mutation.
    #[inline]
    pub fn nulls_mut(&mut self) -> &mut NullBitmap {
        &mut self.nulls
    }

    fn mismatch(&self, expected: PhysType) -> CorvusError {
        CorvusError::TypeMismatch {
            expected,
            actual: self.phys,
        }
    }

    /// Views the values as a fixed-width integer slice.
    #[inline]
    pub fn fixed<T: FixedInt>(&self) -> CorvusResult<&[T]> {
        T::slice(&self.data).ok_or_else(|| self.mismatch(T::PHYS))
    }

    /// Mutably views the values as a fixed-width integer slice.
    #[inline]
    pub fn fixed_mut<T: FixedInt>(&mut self) -> CorvusResult<&mut [T]> {
        match T::slice_mut(&mut self.data) {
            Some(values) => Ok(values),
            None => Err(CorvusError::TypeMismatch {
                expected: T::PHYS,
                actual: self.phys,
            }),
        }
    }

    /// Views the values as a boolean slice.
    #[inline]
    pub fn bools(&self) -> CorvusResult<&[bool]> {
        match &self.data {
            ColumnData::Bool(values) => Ok(values),
            _ => Err(self.mismatch(PhysType::Bool)),
        }
    }

    /// Mutably views the values as a boolean slice.
    #[inline]
    pub fn bools_mut(&mut self) -> CorvusResult<&mut [bool]> {
        match &mut self.data {
            ColumnData::Bool(values) => Ok(values),
            _ => Err(CorvusError::TypeMismatch {
                expected: PhysType::Bool,
                actual: self.phys,
            }),
        }
    }

    /// Views the values as a bytes column.
    #[inline]
    pub fn bytes(&self) -> CorvusResult<&ByteStore> {
        match &self.data {
            ColumnData::Bytes(store) => Ok(store),
            _ => Err(self.mismatch(PhysType::Bytes)),
        }
    }

    /// Mutably views the values as a bytes column.
    #[inline]
    pub fn bytes_mut(&mut self) -> CorvusResult<&mut ByteStore> {
        match &mut self.data {
            ColumnData::Bytes(store) => Ok(store),
            _ => Err(CorvusError::TypeMismatch {
                expected: PhysType::Bytes,
                actual: self.phys,
            }),
        }
    }

    /// Splits the vector into its bytes storage and null bitmap for
    /// simultaneous mutation, as kernels writing a bytes output need.
    pub fn bytes_with_nulls_mut(&mut self) -> CorvusResult<(&mut ByteStore, &mut NullBitmap)> {
        match &mut self.data {
            ColumnData::Bytes(store) => Ok((store, &mut self.nulls)),
            _ => Err(CorvusError::TypeMismatch {
                expected: PhysType::Bytes,
                actual: self.phys,
            }),
        }
    }

    /// Returns the heap bytes backing this vector.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        let data = match &self.data {
            ColumnData::Bool(v) => v.capacity() * std::mem::size_of::<bool>(),
            ColumnData::Int16(v) => v.capacity() * std::mem::size_of::<i16>(),
            ColumnData::Int32(v) => v.capacity() * std::mem::size_of::<i32>(),
            ColumnData::Int64(v) => v.capacity() * std::mem::size_of::<i64>(),
            ColumnData::Bytes(b) => b.allocated_bytes(),
        };
        data + self.nulls.allocated_bytes()
    }

    /// Copies `count` physical rows from `src` starting at `offset` into
    /// rows `0..count` of this vector, replacing its null markers.
    ///
    /// This is the leaf-side fill: stale NULL markers on this vector are
    /// cleared before the new rows land.
    pub fn copy_range_from(
        &mut self,
        src: &Vector,
        offset: usize,
        count: usize,
    ) -> CorvusResult<()> {
        match (&mut self.data, &src.data) {
            (ColumnData::Bool(dst), ColumnData::Bool(s)) => {
                dst[..count].copy_from_slice(&s[offset..offset + count]);
            }
            (ColumnData::Int16(dst), ColumnData::Int16(s)) => {
                dst[..count].copy_from_slice(&s[offset..offset + count]);
            }
            (ColumnData::Int32(dst), ColumnData::Int32(s)) => {
                dst[..count].copy_from_slice(&s[offset..offset + count]);
            }
            (ColumnData::Int64(dst), ColumnData::Int64(s)) => {
                dst[..count].copy_from_slice(&s[offset..offset + count]);
            }
            (ColumnData::Bytes(dst), ColumnData::Bytes(s)) => {
                dst.reset();
                for row in 0..count {
                    dst.set(row, s.get(offset + row));
                }
            }
            _ => return Err(self.mismatch(src.phys)),
        }

        self.nulls.clear();
        if src.nulls.maybe_has_nulls() {
            for row in 0..count {
                if src.nulls.is_null(offset + row) {
                    self.nulls.set_null(row);
                }
            }
        }
        Ok(())
    }

    /// Copies `count` logical rows from `src` into rows `0..count` of
    /// this vector, resolving `sel` when present.
    ///
    /// The copy compacts: selected rows land densely in selection order,
    /// so the destination needs no selection list of its own.
    pub fn copy_logical_rows_from(
        &mut self,
        src: &Vector,
        sel: Option<&[usize]>,
        count: usize,
    ) -> CorvusResult<()> {
        self.nulls.clear();
        match (&mut self.data, &src.data) {
            (ColumnData::Bool(dst), ColumnData::Bool(s)) => {
                for i in 0..count {
                    dst[i] = s[sel.map_or(i, |s| s[i])];
                }
            }
            (ColumnData::Int16(dst), ColumnData::Int16(s)) => {
                for i in 0..count {
                    dst[i] = s[sel.map_or(i, |s| s[i])];
                }
            }
            (ColumnData::Int32(dst), ColumnData::Int32(s)) => {
                for i in 0..count {
                    dst[i] = s[sel.map_or(i, |s| s[i])];
                }
            }
            (ColumnData::Int64(dst), ColumnData::Int64(s)) => {
                for i in 0..count {
                    dst[i] = s[sel.map_or(i, |s| s[i])];
                }
            }
            (ColumnData::Bytes(dst), ColumnData::Bytes(s)) => {
                dst.reset();
                for i in 0..count {
                    dst.set(i, s.get(sel.map_or(i, |s| s[i])));
                }
            }
            _ => return Err(self.mismatch(src.phys)),
        }

        if src.nulls.maybe_has_nulls() {
            for i in 0..count {
                if src.nulls.is_null(sel.map_or(i, |s| s[i])) {
                    self.nulls.set_null(i);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Construction from engine-owned values (leaf data, tests, benches)
    // =========================================================================

    /// Builds a boolean vector; `None` marks NULL.
    #[must_use]
    pub fn from_bool_values(values: &[Option<bool>]) -> Self {
        let mut vector = Self::with_capacity(PhysType::Bool, values.len());
        if let ColumnData::Bool(dst) = &mut vector.data {
            for (row, value) in values.iter().enumerate() {
                match value {
                    Some(v) => dst[row] = *v,
                    None => vector.nulls.set_null(row),
                }
            }
        }
        vector
    }

    /// Builds an `Int16` vector; `None` marks NULL.
    #[must_use]
    pub fn from_int16_values(values: &[Option<i16>]) -> Self {
        Self::from_fixed_values(values)
    }

    /// Builds an `Int32` vector; `None` marks NULL.
    #[must_use]
    pub fn from_int32_values(values: &[Option<i32>]) -> Self {
        Self::from_fixed_values(values)
    }

    /// Builds an `Int64` vector; `None` marks NULL.
    #[must_use]
    pub fn from_int64_values(values: &[Option<i64>]) -> Self {
        Self::from_fixed_values(values)
    }

    fn from_fixed_values<T: FixedInt>(values: &[Option<T>]) -> Self {
        let mut vector = Self::with_capacity(T::PHYS, values.len());
        if let Some(dst) = T::slice_mut(&mut vector.data) {
            for (row, value) in values.iter().enumerate() {
                match value {
                    Some(v) => dst[row] = *v,
                    None => vector.nulls.set_null(row),
                }
            }
        }
        vector
    }

    /// Builds a bytes vector from UTF-8 strings; `None` marks NULL.
    #[must_use]
    pub fn from_utf8_values(values: &[Option<&str>]) -> Self {
        let mut vector = Self::with_capacity(PhysType::Bytes, values.len());
        if let ColumnData::Bytes(dst) = &mut vector.data {
            for (row, value) in values.iter().enumerate() {
                match value {
                    Some(v) => dst.set(row, v.as_bytes()),
                    None => vector.nulls.set_null(row),
                }
            }
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let vector = Vector::with_capacity(PhysType::Int32, 8);
        assert_eq!(vector.capacity(), 8);
        assert!(vector.fixed::<i32>().is_ok());

        let err = vector.fixed::<i64>().unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_from_values_sets_nulls() {
        let vector = Vector::from_int64_values(&[Some(1), None, Some(3)]);
        let values = vector.fixed::<i64>().unwrap();
        assert_eq!(values[0], 1);
        assert_eq!(values[2], 3);
        assert!(!vector.nulls().is_null(0));
        assert!(vector.nulls().is_null(1));
    }

    #[test]
    fn test_from_utf8_values() {
        let vector = Vector::from_utf8_values(&[Some("hello"), None, Some("")]);
        let store = vector.bytes().unwrap();
        assert_eq!(store.get(0), b"hello");
        assert_eq!(store.get(2), b"");
        assert!(vector.nulls().is_null(1));
    }

    #[test]
    fn test_copy_range_from_clears_stale_nulls() {
        let src = Vector::from_int64_values(&[Some(10), Some(20), None, Some(40)]);
        let mut dst = Vector::with_capacity(PhysType::Int64, 4);
        dst.nulls_mut().set_null(0);

        dst.copy_range_from(&src, 1, 3).unwrap();
        let values = dst.fixed::<i64>().unwrap();
        assert_eq!(values[0], 20);
        assert_eq!(values[2], 40);
        assert!(!dst.nulls().is_null(0), "stale marker survived the copy");
        assert!(dst.nulls().is_null(1));
    }

    #[test]
    fn test_copy_logical_rows_resolves_selection() {
        let src = Vector::from_utf8_values(&[Some("a"), Some("b"), Some("c"), None]);
        let mut dst = Vector::with_capacity(PhysType::Bytes, 4);

        dst.copy_logical_rows_from(&src, Some(&[2, 0, 3]), 3).unwrap();
        let store = dst.bytes().unwrap();
        assert_eq!(store.get(0), b"c");
        assert_eq!(store.get(1), b"a");
        assert!(dst.nulls().is_null(2));
    }

    #[test]
    fn test_copy_type_mismatch_is_internal() {
        let src = Vector::with_capacity(PhysType::Int32, 2);
        let mut dst = Vector::with_capacity(PhysType::Int64, 2);
        let err = dst.copy_range_from(&src, 0, 2).unwrap_err();
        assert!(err.is_internal());
    }
}

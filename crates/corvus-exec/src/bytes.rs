//! Variable-width byte column storage.
//!
//! A `ByteStore` keeps every value of a column in one contiguous buffer,
//! with an offsets array mapping each row to its window. This trades
//! random-order writes for cache-friendly reads and a single reusable
//! allocation: `set` must be called with nondecreasing row indices within
//! one fill, and `reset` rewinds the store for the next batch without
//! releasing its buffers.

/// Contiguous storage for one variable-width bytes column.
#[derive(Debug, Clone)]
pub struct ByteStore {
    /// All values, concatenated in row order.
    buf: Vec<u8>,
    /// `offsets[row]..offsets[row + 1]` is the window of row `row`.
    offsets: Vec<usize>,
    /// Highest row index written since the last reset.
    max_set: usize,
}

impl ByteStore {
    /// Creates a store with room for `capacity` rows and no data.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            offsets: vec![0; capacity + 1],
            max_set: 0,
        }
    }

    /// Returns the number of rows this store covers.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns the value at `row`.
    ///
    /// Rows that have not been written since the last reset read as
    /// empty.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize) -> &[u8] {
        if row > self.max_set {
            return &[];
        }
        &self.buf[self.offsets[row]..self.offsets[row + 1]]
    }

    /// Writes the value at `row`.
    ///
    /// Within one fill, rows must be written in nondecreasing order;
    /// skipped rows read back as empty. Rewriting the most recently
    /// written row replaces its value. Writing at a row below `max_set`
    /// violates the fill protocol and is rejected in debug builds.
    pub fn set(&mut self, row: usize, value: &[u8]) {
        debug_assert!(row < self.capacity(), "row {row} beyond store capacity");
        debug_assert!(
            row >= self.max_set,
            "bytes column rows must be written in nondecreasing order \
             (row {row} after {})",
            self.max_set
        );

        // Backfill skipped rows as empty so their windows stay ordered.
        let tail = self.offsets[self.max_set + 1];
        for offset in &mut self.offsets[self.max_set + 1..=row] {
            *offset = tail;
        }

        self.buf.truncate(self.offsets[row]);
        self.buf.extend_from_slice(value);
        self.offsets[row + 1] = self.buf.len();
        self.max_set = row;
    }

    /// Rewinds the store for a new fill, keeping its allocations.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.offsets.fill(0);
        self.max_set = 0;
    }

    /// Grows the store to cover at least `capacity` rows.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity + 1 > self.offsets.len() {
            let tail = self.offsets[self.max_set + 1];
            self.offsets.resize(capacity + 1, tail);
        }
    }

    /// Returns the heap bytes backing this store.
    #[inline]
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.buf.capacity() + self.offsets.capacity() * std::mem::size_of::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_in_order() {
        let mut store = ByteStore::with_capacity(4);
        store.set(0, b"hello");
        store.set(1, b"");
        store.set(2, b"world");
        assert_eq!(store.get(0), b"hello");
        assert_eq!(store.get(1), b"");
        assert_eq!(store.get(2), b"world");
    }

    #[test]
    fn test_skipped_rows_read_empty() {
        let mut store = ByteStore::with_capacity(5);
        store.set(3, b"late");
        assert_eq!(store.get(0), b"");
        assert_eq!(store.get(1), b"");
        assert_eq!(store.get(2), b"");
        assert_eq!(store.get(3), b"late");
        assert_eq!(store.get(4), b"");
    }

    #[test]
    fn test_rewrite_last_row() {
        let mut store = ByteStore::with_capacity(2);
        store.set(0, b"abc");
        store.set(1, b"first");
        store.set(1, b"second");
        assert_eq!(store.get(0), b"abc");
        assert_eq!(store.get(1), b"second");
    }

    #[test]
    fn test_reset_keeps_capacity_drops_data() {
        let mut store = ByteStore::with_capacity(3);
        store.set(0, b"stale");
        store.set(2, b"data");
        let allocated = store.allocated_bytes();
        store.reset();
        assert_eq!(store.get(0), b"");
        assert_eq!(store.get(2), b"");
        assert_eq!(store.allocated_bytes(), allocated);

        store.set(0, b"fresh");
        assert_eq!(store.get(0), b"fresh");
    }

    #[test]
    fn test_ensure_capacity() {
        let mut store = ByteStore::with_capacity(2);
        store.set(1, b"xy");
        store.ensure_capacity(8);
        assert!(store.capacity() >= 8);
        assert_eq!(store.get(1), b"xy");
        store.set(7, b"z");
        assert_eq!(store.get(7), b"z");
    }
}

//! Null bitmaps for column vectors.
//!
//! Every vector carries an independent bitmap recording which physical
//! rows hold NULL. The bitmap is sized to the vector's buffer capacity,
//! not the batch's current logical length: storage is reused across
//! batches, so markers from a previous batch must be cleared explicitly
//! before new data occupies the same positions.

const WORD_BITS: usize = 64;

/// A set of physical row indices currently marked NULL.
///
/// `maybe_has_nulls` is a cheap over-approximation: when false, no row is
/// NULL and per-row tests short-circuit; when true, the bitmap must be
/// consulted.
#[derive(Debug, Clone)]
pub struct NullBitmap {
    /// Packed bits, one per physical row; a set bit means NULL.
    words: Vec<u64>,
    /// False only when no bit is set.
    maybe_has_nulls: bool,
}

impl NullBitmap {
    /// Creates a bitmap covering `capacity` rows with no NULLs.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS)],
            maybe_has_nulls: false,
        }
    }

    /// Returns the number of rows this bitmap covers.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Returns true if any row might be NULL.
    ///
    /// A false result is exact; a true result may include bitmaps whose
    /// markers were all cleared individually.
    #[inline]
    #[must_use]
    pub fn maybe_has_nulls(&self) -> bool {
        self.maybe_has_nulls
    }

    /// Returns true if the row at `row` is NULL.
    #[inline]
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        if !self.maybe_has_nulls {
            return false;
        }
        let word = row / WORD_BITS;
        if word >= self.words.len() {
            return false;
        }
        (self.words[word] >> (row % WORD_BITS)) & 1 == 1
    }

    /// Marks the row at `row` as NULL.
    #[inline]
    pub fn set_null(&mut self, row: usize) {
        debug_assert!(row < self.capacity(), "row {row} beyond bitmap capacity");
        self.words[row / WORD_BITS] |= 1 << (row % WORD_BITS);
        self.maybe_has_nulls = true;
    }

    /// Clears every NULL marker.
    ///
    /// Producers reusing a vector's storage must call this before writing
    /// new data; freshly reused storage is never assumed to be clear.
    pub fn clear(&mut self) {
        if self.maybe_has_nulls {
            self.words.fill(0);
            self.maybe_has_nulls = false;
        }
    }

    /// Grows the bitmap to cover at least `capacity` rows. New rows are
    /// not NULL.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let words = capacity.div_ceil(WORD_BITS);
        if words > self.words.len() {
            self.words.resize(words, 0);
        }
    }

    /// Returns the heap bytes backing this bitmap.
    #[inline]
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>()
    }
}

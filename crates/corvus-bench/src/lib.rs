//! Benchmark utilities for the CorvusDB execution engine.
//!
//! Provides generators for the columnar data sets the benchmarks run
//! over, so each bench file only describes what it measures.

#![warn(clippy::all)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use corvus_common::types::PhysType;
use corvus_exec::{Allocator, ColumnarSource, Vector};

/// Fixed seed so benchmark runs measure the same data.
const SEED: u64 = 0xC0117D;

/// A generated substring workload: source strings plus start/length
/// argument columns.
pub struct SubstringData {
    /// Source string column.
    pub values: Vector,
    /// Start argument column (1-indexed).
    pub starts: Vector,
    /// Length argument column.
    pub lengths: Vector,
    /// Row count.
    pub rows: usize,
}

/// Generates `rows` random ASCII strings of up to `max_len` bytes with
/// the given fraction of NULL rows, plus in-range start/length columns.
pub fn substring_data(rows: usize, max_len: usize, null_fraction: f64) -> SubstringData {
    let mut rng = StdRng::seed_from_u64(SEED);

    let strings: Vec<Option<String>> = (0..rows)
        .map(|_| {
            if rng.gen_bool(null_fraction) {
                None
            } else {
                let len = rng.gen_range(0..=max_len);
                Some((0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect())
            }
        })
        .collect();
    let values: Vec<Option<&str>> = strings.iter().map(|s| s.as_deref()).collect();

    let starts: Vec<Option<i64>> = (0..rows)
        .map(|_| Some(rng.gen_range(1..=max_len.max(1) as i64)))
        .collect();
    let lengths: Vec<Option<i64>> = (0..rows)
        .map(|_| Some(rng.gen_range(0..=max_len as i64)))
        .collect();

    SubstringData {
        values: Vector::from_utf8_values(&values),
        starts: Vector::from_int64_values(&starts),
        lengths: Vector::from_int64_values(&lengths),
        rows,
    }
}

/// Builds a leaf source serving the workload with an appended bytes
/// output slot, ready to feed a substring operator.
pub fn substring_source(
    allocator: &Allocator,
    data: SubstringData,
    batch_capacity: usize,
) -> ColumnarSource {
    ColumnarSource::new(
        allocator,
        vec![data.values, data.starts, data.lengths],
        data.rows,
        &[PhysType::Bytes],
        batch_capacity,
    )
    .expect("bench source construction")
}

/// The batch schema produced by [`substring_source`].
pub const SUBSTRING_SCHEMA: [PhysType; 4] = [
    PhysType::Bytes,
    PhysType::Int64,
    PhysType::Int64,
    PhysType::Bytes,
];

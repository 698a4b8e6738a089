//! End-to-end pipeline tests for the CorvusDB execution engine.
//!
//! These tests assemble full operator trees (leaf source, filter,
//! substring kernel, projection) and drive them through the pipeline
//! runner, verifying the engine-wide properties that individual module
//! tests cannot: selection lists flowing through kernels, storage reuse
//! across batches, budget enforcement across a whole query, and the
//! idempotent end-of-stream contract at the root.

use corvus_common::config::ExecConfig;
use corvus_common::error::CorvusError;
use corvus_common::types::PhysType;
use corvus_exec::{
    new_substring_operator, Allocator, BoolColumnFilter, CancelToken, ColumnarSource, Operator,
    PipelineRunner, QueryOutcome, SimpleProject, Vector,
};

/// Batch schema used by the full pipeline: source string, start, length,
/// keep flag, and the substring output slot.
const SCHEMA: [PhysType; 5] = [
    PhysType::Bytes,
    PhysType::Int64,
    PhysType::Int64,
    PhysType::Bool,
    PhysType::Bytes,
];

struct TableRow {
    value: Option<&'static str>,
    start: Option<i64>,
    length: Option<i64>,
    keep: bool,
}

fn row(
    value: Option<&'static str>,
    start: Option<i64>,
    length: Option<i64>,
    keep: bool,
) -> TableRow {
    TableRow {
        value,
        start,
        length,
        keep,
    }
}

/// Builds source -> filter(keep) -> substring -> project(output) over
/// the given rows.
fn build_pipeline(
    allocator: &Allocator,
    rows: &[TableRow],
    batch_capacity: usize,
) -> Box<dyn Operator> {
    let values: Vec<Option<&str>> = rows.iter().map(|r| r.value).collect();
    let starts: Vec<Option<i64>> = rows.iter().map(|r| r.start).collect();
    let lengths: Vec<Option<i64>> = rows.iter().map(|r| r.length).collect();
    let keeps: Vec<Option<bool>> = rows.iter().map(|r| Some(r.keep)).collect();

    let source = ColumnarSource::new(
        allocator,
        vec![
            Vector::from_utf8_values(&values),
            Vector::from_int64_values(&starts),
            Vector::from_int64_values(&lengths),
            Vector::from_bool_values(&keeps),
        ],
        rows.len(),
        &[PhysType::Bytes],
        batch_capacity,
    )
    .expect("source construction");

    let filter = BoolColumnFilter::new(Box::new(source), 3);
    let substring = new_substring_operator(
        allocator.clone(),
        &SCHEMA,
        [0, 1, 2],
        4,
        Box::new(filter),
    )
    .expect("substring construction");

    Box::new(
        SimpleProject::new(
            allocator.clone(),
            substring,
            &SCHEMA,
            vec![4],
            batch_capacity,
        )
        .expect("projection construction"),
    )
}

/// Drains the pipeline and collects the single projected output column.
fn collect_outputs(
    root: Box<dyn Operator>,
    cancel: CancelToken,
) -> Result<(Vec<Option<Vec<u8>>>, QueryOutcome), CorvusError> {
    let mut outputs = Vec::new();
    let mut runner = PipelineRunner::new(root, cancel);
    let outcome = runner.run_with(|batch| {
        let column = batch.column(0)?;
        let store = column.bytes()?;
        for i in 0..batch.len() {
            let row = batch.selection().map_or(i, |s| s[i]);
            if column.nulls().is_null(row) {
                outputs.push(None);
            } else {
                outputs.push(Some(store.get(row).to_vec()));
            }
        }
        Ok(())
    })?;
    Ok((outputs, outcome))
}

#[test]
fn test_full_pipeline_end_to_end() {
    let config = ExecConfig::for_testing();
    config.validate().expect("test config");
    let allocator = Allocator::for_config(&config);

    let rows = vec![
        row(Some("hello"), Some(2), Some(3), true),
        row(Some("filtered out"), Some(1), Some(5), false),
        row(Some("hello"), Some(0), Some(3), true),
        row(Some("hello"), Some(10), Some(5), true),
        row(None, Some(1), Some(1), true),
        row(Some("hello"), None, Some(1), true),
        row(Some("corvus"), Some(2), Some(i64::MAX), true),
    ];
    let root = build_pipeline(&allocator, &rows, config.batch_capacity);
    let (outputs, outcome) = collect_outputs(root, CancelToken::new()).expect("pipeline");

    assert_eq!(
        outputs,
        vec![
            Some(b"ell".to_vec()),
            // start 0 clamps to the first byte
            Some(b"hel".to_vec()),
            // start beyond the value: empty, not NULL
            Some(b"".to_vec()),
            // NULL source propagates
            None,
            // NULL start propagates
            None,
            // overflowing start + length slices to the end
            Some(b"orvus".to_vec()),
        ]
    );
    assert_eq!(outcome.rows, 6);
}

#[test]
fn test_multi_batch_storage_reuse() {
    // A batch capacity of 2 forces the pipeline to reuse every vector
    // several times; values and NULL markers must not leak between
    // batches.
    let allocator = Allocator::with_budget(1 << 20);
    let rows = vec![
        row(Some("aaaa"), Some(1), Some(2), true),
        row(None, Some(1), Some(2), true),
        row(Some("bb"), Some(1), Some(2), true),
        row(Some("cccc"), Some(3), Some(2), true),
        row(Some("dd"), None, Some(2), true),
        row(Some("eeee"), Some(1), Some(100), true),
    ];
    let root = build_pipeline(&allocator, &rows, 2);
    let (outputs, outcome) = collect_outputs(root, CancelToken::new()).expect("pipeline");

    assert_eq!(
        outputs,
        vec![
            Some(b"aa".to_vec()),
            None,
            Some(b"bb".to_vec()),
            Some(b"cc".to_vec()),
            None,
            Some(b"eeee".to_vec()),
        ]
    );
    assert_eq!(outcome.batches, 3);
}

#[test]
fn test_negative_length_aborts_the_query() {
    let allocator = Allocator::with_budget(1 << 20);
    let rows = vec![
        row(Some("fine"), Some(1), Some(2), true),
        row(Some("bad"), Some(1), Some(-5), true),
        row(Some("unreached"), Some(1), Some(2), true),
    ];
    let root = build_pipeline(&allocator, &rows, 8);
    let err = collect_outputs(root, CancelToken::new()).unwrap_err();

    assert!(err.is_expected());
    assert!(matches!(
        err,
        CorvusError::NegativeSubstringLength { length: -5 }
    ));
}

#[test]
fn test_budget_exhaustion_fails_query_cleanly() {
    // A budget big enough to build the pipeline but too small for the
    // kernel outputs: the query must fail with the expected budget
    // error, and the ledger must keep the charges made so far rather
    // than resetting.
    let rows: Vec<TableRow> = (0..2048)
        .map(|_| row(Some("a long-ish value to charge"), Some(1), Some(100), true))
        .collect();

    // Measure the construction footprint against an effectively
    // unlimited budget, then rerun with barely more than that.
    let probe = Allocator::with_budget(usize::MAX);
    drop(build_pipeline(&probe, &rows, 64));
    let budget = probe.account().used() + 512;

    let allocator = Allocator::with_budget(budget);
    let root = build_pipeline(&allocator, &rows, 64);
    match collect_outputs(root, CancelToken::new()) {
        Err(err) => {
            assert!(err.is_expected());
            assert!(matches!(err, CorvusError::MemoryBudgetExceeded { .. }));
            assert!(allocator.account().used() > 0, "prior charges were dropped");
        }
        Ok(_) => panic!("query fit in a budget sized to fail"),
    }
}

#[test]
fn test_root_exhaustion_is_idempotent() {
    let allocator = Allocator::with_budget(1 << 20);
    let rows = vec![row(Some("once"), Some(1), Some(4), true)];
    let mut root = build_pipeline(&allocator, &rows, 4);

    assert_eq!(root.next().expect("first pull").len(), 1);
    for _ in 0..3 {
        assert!(root.next().expect("pull after end").is_empty());
    }
}

#[test]
fn test_independent_pipelines_on_separate_threads() {
    // Each pipeline owns its ledger; nothing is shared between them.
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            std::thread::spawn(move || {
                let allocator = Allocator::with_budget(1 << 20);
                let rows = vec![
                    row(Some("thread"), Some(1), Some(6), true),
                    row(Some("thread"), Some(worker + 1), Some(2), true),
                ];
                let root = build_pipeline(&allocator, &rows, 4);
                collect_outputs(root, CancelToken::new()).expect("pipeline")
            })
        })
        .collect();

    for handle in handles {
        let (outputs, outcome) = handle.join().expect("worker");
        assert_eq!(outcome.rows, 2);
        assert_eq!(outputs[0], Some(b"thread".to_vec()));
    }
}

#[test]
fn test_cancellation_stops_the_pipeline() {
    let allocator = Allocator::with_budget(1 << 20);
    let rows: Vec<TableRow> = (0..64)
        .map(|_| row(Some("value"), Some(1), Some(5), true))
        .collect();
    let root = build_pipeline(&allocator, &rows, 4);

    let cancel = CancelToken::new();
    let mut runner = PipelineRunner::new(root, cancel.clone());
    let mut batches = 0;
    let err = runner
        .run_with(|_| {
            batches += 1;
            if batches == 2 {
                cancel.cancel();
            }
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, CorvusError::Cancelled));
    assert_eq!(batches, 2);
}

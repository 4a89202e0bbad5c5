//! Prometheus metrics for the deletion pipeline.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Pipeline Runs
// =============================================================================

/// Pipeline runs by result.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shareable_lists_pipeline_runs_total",
            "Total deletion pipeline runs",
        ),
        &["result"], // "completed", "failed", "rejected"
    )
    .unwrap()
});

/// Wall-clock duration of completed runs.
pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "shareable_lists_pipeline_run_duration_seconds",
            "Duration of completed deletion runs",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

// =============================================================================
// Fetch & Dispatch
// =============================================================================

/// Non-empty pages read from the list item store.
pub static PAGES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shareable_lists_pages_fetched_total",
        "Non-empty pages of matching list items fetched",
    )
    .unwrap()
});

/// Identifiers matched across all runs.
pub static IDENTIFIERS_MATCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shareable_lists_identifiers_matched_total",
        "List item identifiers matched for deletion",
    )
    .unwrap()
});

/// Wire batches by send result.
pub static BATCHES_DISPATCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shareable_lists_batches_dispatched_total",
            "Wire batches handed to the deletion queue",
        ),
        &["result"], // "sent", "failed"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(PAGES_FETCHED.clone()),
        Box::new(IDENTIFIERS_MATCHED.clone()),
        Box::new(BATCHES_DISPATCHED.clone()),
    ]
}

//! Failure reporting for queue sends.
//!
//! A failed send never raises. It becomes a [`SendFailure`] which the
//! [`FailureReporter`] writes to the log and hands to an [`ErrorTracker`].

mod trackers;

pub use trackers::{AuditErrorTracker, NoopErrorTracker};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::pipeline::WireBatch;

/// Structured report for one wire batch that could not be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFailure {
    pub run_id: String,
    pub sequence: usize,
    pub user_id: String,
    pub url: String,
    /// Error message from the queue client (or the panicked task).
    pub message: String,
    pub entry_count: usize,
    pub identifier_count: usize,
    /// The failed batch as JSON, so it can be replayed by hand.
    pub batch: String,
}

impl SendFailure {
    pub fn new(batch: &WireBatch, user_id: &str, url: &str, message: impl Into<String>) -> Self {
        Self {
            run_id: batch.run_id.clone(),
            sequence: batch.sequence,
            user_id: user_id.to_string(),
            url: url.to_string(),
            message: message.into(),
            entry_count: batch.entries.len(),
            identifier_count: batch.identifier_count(),
            batch: serde_json::to_string(batch).unwrap_or_else(|e| {
                format!("{{\"serialization_error\":\"{}\"}}", e)
            }),
        }
    }
}

/// Error-tracking sink. Implementations must not block or fail.
pub trait ErrorTracker: Send + Sync {
    /// Name of this tracker, for startup logs
    fn name(&self) -> &str;

    /// Record a failure. Fire-and-forget.
    fn capture(&self, failure: &SendFailure);
}

/// Delivers each failure to the log and to the configured tracker.
#[derive(Clone)]
pub struct FailureReporter {
    tracker: Arc<dyn ErrorTracker>,
}

impl FailureReporter {
    pub fn new(tracker: Arc<dyn ErrorTracker>) -> Self {
        Self { tracker }
    }

    /// Reporter that only logs.
    pub fn log_only() -> Self {
        Self::new(Arc::new(NoopErrorTracker))
    }

    pub fn tracker_name(&self) -> &str {
        self.tracker.name()
    }

    pub fn report(&self, failure: &SendFailure) {
        error!(
            run_id = %failure.run_id,
            sequence = failure.sequence,
            user_id = %failure.user_id,
            url = %failure.url,
            entries = failure.entry_count,
            identifiers = failure.identifier_count,
            batch = %failure.batch,
            error = %failure.message,
            "Failed to enqueue list item deletion batch"
        );
        self.tracker.capture(failure);
    }
}

impl std::fmt::Debug for FailureReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureReporter")
            .field("tracker", &self.tracker.name())
            .finish()
    }
}

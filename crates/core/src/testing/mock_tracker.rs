//! Recording error tracker for testing.

use std::sync::{Arc, Mutex};

use crate::reporting::{ErrorTracker, SendFailure};

/// [`ErrorTracker`] that keeps every captured failure for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingErrorTracker {
    captured: Arc<Mutex<Vec<SendFailure>>>,
}

impl RecordingErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures captured so far, in capture order.
    pub fn captured(&self) -> Vec<SendFailure> {
        self.captured.lock().unwrap().clone()
    }
}

impl ErrorTracker for RecordingErrorTracker {
    fn name(&self) -> &str {
        "recording"
    }

    fn capture(&self, failure: &SendFailure) {
        self.captured.lock().unwrap().push(failure.clone());
    }
}

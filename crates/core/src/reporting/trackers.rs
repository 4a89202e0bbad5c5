use crate::audit::{AuditEvent, AuditHandle};

use super::{ErrorTracker, SendFailure};

/// Discards failures; the log line written by the reporter is all that remains.
#[derive(Debug, Default)]
pub struct NoopErrorTracker;

impl ErrorTracker for NoopErrorTracker {
    fn name(&self) -> &str {
        "noop"
    }

    fn capture(&self, _failure: &SendFailure) {}
}

/// Persists failures to the audit trail as `batch_send_failed` events.
#[derive(Clone)]
pub struct AuditErrorTracker {
    audit: AuditHandle,
}

impl AuditErrorTracker {
    pub fn new(audit: AuditHandle) -> Self {
        Self { audit }
    }
}

impl ErrorTracker for AuditErrorTracker {
    fn name(&self) -> &str {
        "audit"
    }

    fn capture(&self, failure: &SendFailure) {
        // try_emit logs on a full channel instead of waiting
        self.audit.try_emit(AuditEvent::BatchSendFailed {
            run_id: failure.run_id.clone(),
            sequence: failure.sequence,
            user_id: failure.user_id.clone(),
            url: failure.url.clone(),
            error: failure.message.clone(),
            entry_count: failure.entry_count,
            identifier_count: failure.identifier_count,
            batch: failure.batch.clone(),
        });
    }
}

//! Accumulates send entries into wire batches and ships them to the queue.

use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::metrics::BATCHES_DISPATCHED;
use crate::queue::QueueClient;
use crate::reporting::{FailureReporter, SendFailure};
use crate::store::DeletionFilter;

use super::types::{SendEntry, SendOutcome, WireBatch};

/// Spawned send that has not been joined yet. Keeps a copy of the batch so
/// a task that never completes can still be reported in full.
struct InFlight {
    batch: WireBatch,
    handle: JoinHandle<SendOutcome>,
}

/// Batches chunks for one run and dispatches each full batch immediately.
///
/// Sends run as independent tasks; the caller keeps feeding chunks while
/// earlier batches are on the wire. [`finish`](Self::finish) flushes the
/// remainder and waits for every send to settle.
pub struct BatchDispatcher {
    queue: Arc<dyn QueueClient>,
    reporter: FailureReporter,
    run_id: String,
    filter: DeletionFilter,
    batch_size: usize,
    pending: Vec<SendEntry>,
    in_flight: Vec<InFlight>,
}

impl BatchDispatcher {
    pub fn new(
        queue: Arc<dyn QueueClient>,
        reporter: FailureReporter,
        run_id: impl Into<String>,
        filter: DeletionFilter,
        batch_size: usize,
    ) -> Self {
        Self {
            queue,
            reporter,
            run_id: run_id.into(),
            filter,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            in_flight: Vec::new(),
        }
    }

    /// Wrap a chunk into a send entry; emits a batch once `batch_size`
    /// entries are pending.
    pub fn push_chunk(&mut self, external_ids: Vec<String>) {
        self.pending.push(SendEntry::new(&self.filter, external_ids));
        if self.pending.len() >= self.batch_size {
            self.emit();
        }
    }

    /// Batches emitted so far, including ones still in flight.
    pub fn batches_emitted(&self) -> usize {
        self.in_flight.len()
    }

    /// Entries waiting for the next batch.
    pub fn pending_entries(&self) -> usize {
        self.pending.len()
    }

    fn emit(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let sequence = self.in_flight.len();
        let entries = std::mem::replace(&mut self.pending, Vec::with_capacity(self.batch_size));
        let batch = WireBatch {
            run_id: self.run_id.clone(),
            sequence,
            entries,
        };

        debug!(
            run_id = %self.run_id,
            sequence,
            entries = batch.entries.len(),
            identifiers = batch.identifier_count(),
            "Dispatching wire batch"
        );

        let handle = tokio::spawn(send_batch(
            Arc::clone(&self.queue),
            self.reporter.clone(),
            self.filter.clone(),
            batch.clone(),
        ));
        self.in_flight.push(InFlight { batch, handle });
    }

    /// Emit the partial batch, if any, then wait for every send to settle.
    ///
    /// Outcomes are returned in sequence order. Never fails: failed sends
    /// were already reported when they settled.
    pub async fn finish(mut self) -> Vec<SendOutcome> {
        self.emit();

        let in_flight = std::mem::take(&mut self.in_flight);
        let (batches, handles): (Vec<_>, Vec<_>) =
            in_flight.into_iter().map(|f| (f.batch, f.handle)).unzip();

        join_all(handles)
            .await
            .into_iter()
            .zip(batches)
            .map(|(joined, batch)| self.settle(joined, batch))
            .collect()
    }

    fn settle(&self, joined: Result<SendOutcome, JoinError>, batch: WireBatch) -> SendOutcome {
        match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                // Cancelled by runtime shutdown; the batch never reached the queue
                let failure = SendFailure::new(
                    &batch,
                    &self.filter.user_id,
                    &self.filter.url,
                    format!("send task did not complete: {}", e),
                );
                BATCHES_DISPATCHED.with_label_values(&["failed"]).inc();
                self.reporter.report(&failure);
                SendOutcome::Failed(failure)
            }
        }
    }
}

async fn send_batch(
    queue: Arc<dyn QueueClient>,
    reporter: FailureReporter,
    filter: DeletionFilter,
    batch: WireBatch,
) -> SendOutcome {
    let result = AssertUnwindSafe(queue.send(&batch)).catch_unwind().await;

    let message = match result {
        Ok(Ok(())) => {
            BATCHES_DISPATCHED.with_label_values(&["sent"]).inc();
            return SendOutcome::Sent {
                sequence: batch.sequence,
                entries: batch.entries.len(),
                identifiers: batch.identifier_count(),
            };
        }
        Ok(Err(e)) => e.to_string(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    BATCHES_DISPATCHED.with_label_values(&["failed"]).inc();
    let failure = SendFailure::new(&batch, &filter.user_id, &filter.url, message);
    reporter.report(&failure);
    SendOutcome::Failed(failure)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("queue client panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("queue client panicked: {}", s)
    } else {
        "queue client panicked".to_string()
    }
}

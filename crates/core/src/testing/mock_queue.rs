//! Mock queue client for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::pipeline::WireBatch;
use crate::queue::{QueueClient, QueueError};

/// A batch the mock received, with the 1-based attempt number it got.
#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub attempt: usize,
    pub batch: WireBatch,
    pub accepted: bool,
}

/// Mock implementation of [`QueueClient`].
///
/// Attempts are numbered from 1 in the order `send` is entered. Failures and
/// panics are scripted per attempt number.
#[derive(Debug, Default)]
pub struct MockQueueClient {
    attempts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    sends: Mutex<Vec<RecordedSend>>,
    failing: Mutex<HashSet<usize>>,
    panicking: Mutex<HashSet<usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the given attempts with a `Rejected` error.
    pub fn fail_attempts(&self, attempts: &[usize]) {
        self.failing.lock().unwrap().extend(attempts);
    }

    /// Panic inside `send` on the given attempts.
    pub fn panic_on_attempts(&self, attempts: &[usize]) {
        self.panicking.lock().unwrap().extend(attempts);
    }

    /// Hold every send for `delay` before settling.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Highest number of sends that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every recorded send, in settle order.
    pub fn recorded_sends(&self) -> Vec<RecordedSend> {
        self.sends.lock().unwrap().clone()
    }

    /// Accepted batches ordered by sequence.
    pub fn sent_batches_in_order(&self) -> Vec<WireBatch> {
        let mut batches: Vec<WireBatch> = self
            .sends
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.accepted)
            .map(|s| s.batch.clone())
            .collect();
        batches.sort_by_key(|b| b.sequence);
        batches
    }
}

#[async_trait]
impl QueueClient for MockQueueClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, batch: &WireBatch) -> Result<(), QueueError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_panic = self.panicking.lock().unwrap().contains(&attempt);
        if should_panic {
            panic!("mock queue panic on attempt {attempt}");
        }

        let accepted = !self.failing.lock().unwrap().contains(&attempt);
        self.sends.lock().unwrap().push(RecordedSend {
            attempt,
            batch: batch.clone(),
            accepted,
        });

        if accepted {
            Ok(())
        } else {
            Err(QueueError::Rejected {
                status: 503,
                body: format!("mock queue failure on attempt {attempt}"),
            })
        }
    }
}

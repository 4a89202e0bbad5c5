//! Drives fetch → chunk → batch → dispatch for one deletion request.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::metrics::{IDENTIFIERS_MATCHED, PIPELINE_RUNS, RUN_DURATION};
use crate::queue::QueueClient;
use crate::reporting::{ErrorTracker, FailureReporter};
use crate::store::{DeletionFilter, ListItemStore};

use super::chunker::chunked;
use super::config::PipelineConfig;
use super::dispatcher::BatchDispatcher;
use super::error::PipelineError;
use super::fetcher::PageFetcher;
use super::types::{RunSummary, SendOutcome};

/// Enqueues deletion of every list item matching a filter.
///
/// Holds no per-run state, so one instance can serve concurrent runs.
pub struct DeletionPipeline {
    config: PipelineConfig,
    store: Arc<dyn ListItemStore>,
    queue: Arc<dyn QueueClient>,
    reporter: FailureReporter,
}

impl DeletionPipeline {
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ListItemStore>,
        queue: Arc<dyn QueueClient>,
        tracker: Arc<dyn ErrorTracker>,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            reporter: FailureReporter::new(tracker),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for `filter`.
    ///
    /// Chunking restarts at every page: with page size 3 and chunk size 2,
    /// five identifiers become `[a,b] [c] [d,e]`, not `[a,b] [c,d] [e]`.
    ///
    /// Only invalid input and store errors are returned as `Err`. Failed
    /// queue sends are reported individually and counted in the summary.
    pub async fn run(&self, filter: &DeletionFilter) -> Result<RunSummary, PipelineError> {
        if let Err(e) = self.validate(filter) {
            PIPELINE_RUNS.with_label_values(&["rejected"]).inc();
            return Err(e);
        }

        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            user_id = %filter.user_id,
            url = %filter.url,
            page_size = self.config.page_size,
            chunk_size = self.config.chunk_size,
            batch_size = self.config.batch_size,
            "Starting list item deletion run"
        );

        let mut fetcher = PageFetcher::new(self.store.as_ref(), filter, self.config.page_size);
        let mut dispatcher = BatchDispatcher::new(
            Arc::clone(&self.queue),
            self.reporter.clone(),
            run_id.clone(),
            filter.clone(),
            self.config.batch_size,
        );

        let mut identifiers = 0usize;
        let mut chunks = 0usize;

        loop {
            let page = match fetcher.next_page() {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(source) => {
                    let offset = fetcher.offset();
                    // Sends already on the wire still settle (and report) first
                    let settled = dispatcher.finish().await;
                    warn!(
                        run_id = %run_id,
                        offset,
                        settled_batches = settled.len(),
                        error = %source,
                        "Deletion run aborted by store error"
                    );
                    PIPELINE_RUNS.with_label_values(&["failed"]).inc();
                    return Err(PipelineError::Fetch { offset, source });
                }
            };

            identifiers += page.len();
            IDENTIFIERS_MATCHED.inc_by(page.len() as u64);

            for chunk in chunked(page.into_iter().map(|r| r.external_id), self.config.chunk_size) {
                chunks += 1;
                dispatcher.push_chunk(chunk);
            }

            // Store calls are synchronous; let spawned sends start between pages
            tokio::task::yield_now().await;
        }

        let outcomes = dispatcher.finish().await;
        let elapsed = started.elapsed();
        RUN_DURATION.observe(elapsed.as_secs_f64());
        PIPELINE_RUNS.with_label_values(&["completed"]).inc();

        let failed_sequences: Vec<usize> = outcomes
            .iter()
            .filter_map(|o| match o {
                SendOutcome::Failed(f) => Some(f.sequence),
                SendOutcome::Sent { .. } => None,
            })
            .collect();

        let summary = RunSummary {
            run_id,
            user_id: filter.user_id.clone(),
            url: filter.url.clone(),
            pages_fetched: fetcher.pages_fetched(),
            identifiers_matched: identifiers,
            chunks,
            batches_attempted: outcomes.len(),
            batches_sent: outcomes.len() - failed_sequences.len(),
            batches_failed: failed_sequences.len(),
            failed_sequences,
            duration_ms: elapsed.as_millis() as u64,
        };

        info!(
            run_id = %summary.run_id,
            pages = summary.pages_fetched,
            identifiers = summary.identifiers_matched,
            batches_sent = summary.batches_sent,
            batches_failed = summary.batches_failed,
            duration_ms = summary.duration_ms,
            "Deletion run completed"
        );

        Ok(summary)
    }

    fn validate(&self, filter: &DeletionFilter) -> Result<(), PipelineError> {
        self.config.validate()?;

        if filter.user_id.trim().is_empty() {
            return Err(PipelineError::InvalidFilter(
                "user_id must not be empty".to_string(),
            ));
        }
        if filter.url.trim().is_empty() {
            return Err(PipelineError::InvalidFilter(
                "url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

//! Batch deletion pipeline.
//!
//! A run pages through the list items matching a [`DeletionFilter`](crate::store::DeletionFilter),
//! splits each page's identifiers into chunks, packs chunks into wire batches,
//! and sends every batch to the deletion queue without waiting on the
//! previous one.
//!
//! ```text
//! PageFetcher ──page──▶ chunked() ──chunk──▶ BatchDispatcher ──batch──▶ QueueClient
//! ```

mod chunker;
mod config;
mod dispatcher;
mod error;
mod fetcher;
mod runner;
mod types;

pub use chunker::{chunked, Chunked};
pub use config::PipelineConfig;
pub use dispatcher::BatchDispatcher;
pub use error::PipelineError;
pub use fetcher::PageFetcher;
pub use runner::DeletionPipeline;
pub use types::{RunSummary, SendEntry, SendOutcome, WireBatch};

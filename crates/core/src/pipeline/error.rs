//! Error types for the pipeline module.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that abort a pipeline run.
///
/// Queue send failures never show up here; they are reported per batch and
/// counted in the run summary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Page, chunk or batch size is not positive.
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Owner key or match value missing.
    #[error("Invalid deletion filter: {0}")]
    InvalidFilter(String),

    /// The store failed while fetching a page.
    #[error("Failed to fetch page at offset {offset}: {source}")]
    Fetch {
        offset: usize,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    /// Whether the run was rejected before touching the store.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::InvalidFilter(_))
    }
}

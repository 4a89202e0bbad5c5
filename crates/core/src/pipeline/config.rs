//! Sizing for the deletion pipeline.

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Page, chunk and batch sizes for one pipeline.
///
/// The three sizes are independent: a chunk size that does not divide the
/// page size is fine, chunk boundaries simply reset at every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Identifiers requested from the store per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Identifiers per chunk (one chunk = one queue message).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunks per wire batch (one batch = one network send).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_page_size() -> usize {
    1000
}

fn default_chunk_size() -> usize {
    100
}

fn default_batch_size() -> usize {
    10
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            chunk_size: default_chunk_size(),
            batch_size: default_batch_size(),
        }
    }
}

impl PipelineConfig {
    pub fn new(page_size: usize, chunk_size: usize, batch_size: usize) -> Self {
        Self {
            page_size,
            chunk_size,
            batch_size,
        }
    }

    /// Rejects any zero size.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [
            ("page_size", self.page_size),
            ("chunk_size", self.chunk_size),
            ("batch_size", self.batch_size),
        ] {
            if value == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "pipeline.{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}

//! Types for the pipeline module.

use serde::{Deserialize, Serialize};

use crate::reporting::SendFailure;
use crate::store::DeletionFilter;

/// One chunk of identifiers plus the context the consumer needs to delete them.
///
/// Serialized as the queue message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEntry {
    pub user_id: String,
    pub url: String,
    pub external_ids: Vec<String>,
}

impl SendEntry {
    pub fn new(filter: &DeletionFilter, external_ids: Vec<String>) -> Self {
        Self {
            user_id: filter.user_id.clone(),
            url: filter.url.clone(),
            external_ids,
        }
    }
}

/// A group of send entries shipped in a single queue call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBatch {
    /// Run that produced the batch.
    pub run_id: String,
    /// Zero-based emission order within the run.
    pub sequence: usize,
    pub entries: Vec<SendEntry>,
}

impl WireBatch {
    /// Total identifiers across all entries.
    pub fn identifier_count(&self) -> usize {
        self.entries.iter().map(|e| e.external_ids.len()).sum()
    }

    /// All identifiers in entry order.
    pub fn external_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.external_ids.iter().map(String::as_str))
    }
}

/// How one wire batch settled.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    Sent {
        sequence: usize,
        entries: usize,
        identifiers: usize,
    },
    Failed(SendFailure),
}

impl SendOutcome {
    pub fn sequence(&self) -> usize {
        match self {
            Self::Sent { sequence, .. } => *sequence,
            Self::Failed(failure) => failure.sequence,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Counters for a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub user_id: String,
    pub url: String,
    /// Non-empty pages returned by the store.
    pub pages_fetched: usize,
    pub identifiers_matched: usize,
    pub chunks: usize,
    pub batches_attempted: usize,
    pub batches_sent: usize,
    pub batches_failed: usize,
    /// Sequences of the batches that failed, ascending.
    pub failed_sequences: Vec<usize>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.batches_failed > 0
    }
}

//! Outbound deletion queue.
//!
//! One [`QueueClient::send`] call carries one [`WireBatch`]. Each entry becomes
//! one queue message whose body is the JSON of a
//! [`SendEntry`](crate::pipeline::SendEntry).

mod http;

pub use http::{HttpQueueClient, QueueMessage, QueueRequest};

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::WireBatch;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection to queue failed: {0}")]
    ConnectionFailed(String),

    #[error("Queue request timed out")]
    Timeout,

    #[error("Queue rejected batch: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to serialize batch: {0}")]
    Serialization(String),
}

/// A message queue that accepts deletion batches.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Returns the name of this queue implementation.
    fn name(&self) -> &str;

    /// Sends one batch. Either every entry was accepted or an error is returned.
    async fn send(&self, batch: &WireBatch) -> Result<(), QueueError>;
}

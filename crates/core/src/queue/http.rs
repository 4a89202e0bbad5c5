//! HTTP queue client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::QueueConfig;
use crate::pipeline::WireBatch;

use super::{QueueClient, QueueError};

/// Request body POSTed to the queue endpoint, one message per entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRequest {
    pub entries: Vec<QueueMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Unique within the request.
    pub id: String,
    /// JSON-encoded `SendEntry`.
    pub body: String,
}

impl QueueRequest {
    pub fn from_batch(batch: &WireBatch) -> Result<Self, QueueError> {
        let entries = batch
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                serde_json::to_string(entry)
                    .map(|body| QueueMessage {
                        id: i.to_string(),
                        body,
                    })
                    .map_err(|e| QueueError::Serialization(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }
}

/// Sends batches to an HTTP queue endpoint.
pub struct HttpQueueClient {
    client: Client,
    config: QueueConfig,
}

impl HttpQueueClient {
    pub fn new(config: QueueConfig) -> Result<Self, QueueError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl QueueClient for HttpQueueClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, batch: &WireBatch) -> Result<(), QueueError> {
        let body = QueueRequest::from_batch(batch)?;

        let mut request = self
            .client
            .post(&self.config.url)
            .header("x-run-id", &batch.run_id)
            .json(&body);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                QueueError::Timeout
            } else {
                QueueError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(QueueError::Rejected {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        debug!(
            run_id = %batch.run_id,
            sequence = batch.sequence,
            entries = batch.entries.len(),
            "Batch accepted by queue"
        );
        Ok(())
    }
}

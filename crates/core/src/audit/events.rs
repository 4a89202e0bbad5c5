use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the service records about its own operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // Service lifecycle
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Deletion requests
    DeletionRequested {
        requested_by: String,
        user_id: String,
        url: String,
    },
    DeletionCompleted {
        run_id: String,
        requested_by: String,
        user_id: String,
        url: String,
        identifiers_matched: usize,
        batches_sent: usize,
        batches_failed: usize,
    },
    DeletionFailed {
        requested_by: String,
        user_id: String,
        url: String,
        error: String,
    },

    // Queue
    BatchSendFailed {
        run_id: String,
        sequence: usize,
        user_id: String,
        url: String,
        error: String,
        entry_count: usize,
        identifier_count: usize,
        /// JSON of the wire batch that was lost.
        batch: String,
    },
}

impl AuditEvent {
    /// Storage key, matches the serde tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::DeletionRequested { .. } => "deletion_requested",
            Self::DeletionCompleted { .. } => "deletion_completed",
            Self::DeletionFailed { .. } => "deletion_failed",
            Self::BatchSendFailed { .. } => "batch_send_failed",
        }
    }

    /// Owner of the list items the event concerns.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::DeletionRequested { user_id, .. }
            | Self::DeletionCompleted { user_id, .. }
            | Self::DeletionFailed { user_id, .. }
            | Self::BatchSendFailed { user_id, .. } => Some(user_id),
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
        }
    }

    pub fn run_id(&self) -> Option<&str> {
        match self {
            Self::DeletionCompleted { run_id, .. } | Self::BatchSendFailed { run_id, .. } => {
                Some(run_id)
            }
            _ => None,
        }
    }
}

/// A stored audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub user_id: Option<String>,
    pub run_id: Option<String>,
    pub data: AuditEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_failed() -> AuditEvent {
        AuditEvent::BatchSendFailed {
            run_id: "run-1".to_string(),
            sequence: 4,
            user_id: "u1".to_string(),
            url: "https://example.com".to_string(),
            error: "timeout".to_string(),
            entry_count: 10,
            identifier_count: 1000,
            batch: "{}".to_string(),
        }
    }

    #[test]
    fn test_event_type_matches_serde_tag() {
        let events = vec![
            AuditEvent::ServiceStarted {
                version: "0.1.0".to_string(),
                config_hash: "abc".to_string(),
            },
            AuditEvent::ServiceStopped {
                reason: "shutdown".to_string(),
            },
            AuditEvent::DeletionRequested {
                requested_by: "svc".to_string(),
                user_id: "u1".to_string(),
                url: "https://example.com".to_string(),
            },
            AuditEvent::DeletionFailed {
                requested_by: "svc".to_string(),
                user_id: "u1".to_string(),
                url: "https://example.com".to_string(),
                error: "db".to_string(),
            },
            batch_failed(),
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.event_type());
        }
    }

    #[test]
    fn test_deserialize_round_trip() {
        let json = serde_json::to_string(&batch_failed()).unwrap();
        let parsed: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, batch_failed());
    }

    #[test]
    fn test_indexed_fields() {
        let event = batch_failed();
        assert_eq!(event.user_id(), Some("u1"));
        assert_eq!(event.run_id(), Some("run-1"));

        let started = AuditEvent::ServiceStarted {
            version: "0.1.0".to_string(),
            config_hash: "abc".to_string(),
        };
        assert_eq!(started.user_id(), None);
        assert_eq!(started.run_id(), None);

        let requested = AuditEvent::DeletionRequested {
            requested_by: "svc".to_string(),
            user_id: "u2".to_string(),
            url: "https://example.com".to_string(),
        };
        assert_eq!(requested.user_id(), Some("u2"));
        assert_eq!(requested.run_id(), None);
    }
}

pub mod audit;
pub mod auth;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod reporting;
pub mod store;
pub mod testing;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditEventEnvelope, AuditFilter, AuditHandle,
    AuditRecord, AuditStore, AuditWriter, SqliteAuditStore,
};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, DatabaseConfig, QueueConfig, SanitizedConfig, ServerConfig,
};
pub use pipeline::{
    chunked, DeletionPipeline, PipelineConfig, PipelineError, RunSummary, SendEntry, WireBatch,
};
pub use queue::{HttpQueueClient, QueueClient, QueueError};
pub use reporting::{
    AuditErrorTracker, ErrorTracker, FailureReporter, NoopErrorTracker, SendFailure,
};
pub use store::{
    DeletionFilter, ListItem, ListItemRef, ListItemStore, NewListItem, SqliteListItemStore,
    StoreError,
};

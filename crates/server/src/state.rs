use std::sync::Arc;
use shareable_lists_core::{
    AuditHandle, AuditStore, Authenticator, Config, DeletionPipeline, ListItemStore,
    SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    audit: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
    list_items: Arc<dyn ListItemStore>,
    pipeline: DeletionPipeline,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        audit: AuditHandle,
        audit_store: Arc<dyn AuditStore>,
        list_items: Arc<dyn ListItemStore>,
        pipeline: DeletionPipeline,
    ) -> Self {
        Self {
            config,
            authenticator,
            audit,
            audit_store,
            list_items,
            pipeline,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn list_items(&self) -> &dyn ListItemStore {
        self.list_items.as_ref()
    }

    pub fn pipeline(&self) -> &DeletionPipeline {
        &self.pipeline
    }
}

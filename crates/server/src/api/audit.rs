use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use shareable_lists_core::{AuditFilter, AuditRecord};

use crate::state::AppState;

/// Maximum allowed limit for audit queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for audit queries
const DEFAULT_LIMIT: i64 = 100;

/// Query parameters for `GET /audit`
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub run_id: Option<String>,
    /// Events at or after this time (RFC 3339)
    pub from: Option<DateTime<Utc>>,
    /// Events at or before this time (RFC 3339)
    pub to: Option<DateTime<Utc>>,
    /// Default 100, max 1000
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditQueryResponse {
    pub events: Vec<AuditRecord>,
    /// Total matching events, ignoring pagination
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct AuditErrorResponse {
    pub error: String,
}

impl AuditQueryParams {
    fn filter(&self) -> AuditFilter {
        let mut filter = AuditFilter::new();
        if let Some(ref event_type) = self.event_type {
            filter = filter.with_event_type(event_type);
        }
        if let Some(ref user_id) = self.user_id {
            filter = filter.with_user_id(user_id);
        }
        if let Some(ref run_id) = self.run_id {
            filter = filter.with_run_id(run_id);
        }
        filter.with_time_range(self.from, self.to)
    }
}

/// Query audit events, newest first
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditQueryResponse>, (StatusCode, Json<AuditErrorResponse>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let filter = params.filter().with_limit(limit).with_offset(offset);
    let internal = |what: &str, e: shareable_lists_core::AuditError| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuditErrorResponse {
                error: format!("Failed to {} audit events: {}", what, e),
            }),
        )
    };

    let events = state
        .audit_store()
        .query(&filter)
        .map_err(|e| internal("query", e))?;
    let total = state
        .audit_store()
        .count(&filter)
        .map_err(|e| internal("count", e))?;

    Ok(Json(AuditQueryResponse {
        events,
        total,
        limit,
        offset,
    }))
}

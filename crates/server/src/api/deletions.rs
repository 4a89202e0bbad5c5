//! Deletion trigger handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use shareable_lists_core::{AuditEvent, DeletionFilter, PipelineError, RunSummary};

use super::middleware::AuthCaller;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body for `POST /deletions`. Missing fields read as empty and are rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequestBody {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub url: String,
}

impl DeletionRequestBody {
    fn filter(&self) -> DeletionFilter {
        DeletionFilter::new(self.user_id.trim(), self.url.trim())
    }
}

#[derive(Debug, Serialize)]
pub struct DeletionResponse {
    /// Always "enqueued": per-batch failures are reported in the summary
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: RunSummary,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub user_id: String,
    pub url: String,
    pub matching_items: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletionErrorResponse {
    pub error: String,
}

type ErrorReply = (StatusCode, Json<DeletionErrorResponse>);

fn error_reply(status: StatusCode, error: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(DeletionErrorResponse {
            error: error.into(),
        }),
    )
}

fn require_complete(filter: &DeletionFilter) -> Result<(), ErrorReply> {
    if filter.is_complete() {
        Ok(())
    } else {
        Err(error_reply(
            StatusCode::BAD_REQUEST,
            "userId and url are required",
        ))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Enqueue deletion of every list item of `userId` that points at `url`.
pub async fn request_deletion(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Json(body): Json<DeletionRequestBody>,
) -> Result<Json<DeletionResponse>, ErrorReply> {
    let filter = body.filter();
    require_complete(&filter)?;

    state.audit().try_emit(AuditEvent::DeletionRequested {
        requested_by: caller.clone(),
        user_id: filter.user_id.clone(),
        url: filter.url.clone(),
    });

    match state.pipeline().run(&filter).await {
        Ok(summary) => {
            info!(
                caller = %caller,
                run_id = %summary.run_id,
                batches_failed = summary.batches_failed,
                "Deletion request enqueued"
            );
            state.audit().try_emit(AuditEvent::DeletionCompleted {
                run_id: summary.run_id.clone(),
                requested_by: caller,
                user_id: summary.user_id.clone(),
                url: summary.url.clone(),
                identifiers_matched: summary.identifiers_matched,
                batches_sent: summary.batches_sent,
                batches_failed: summary.batches_failed,
            });
            Ok(Json(DeletionResponse {
                status: "enqueued",
                summary,
            }))
        }
        Err(e) => {
            warn!(caller = %caller, user_id = %filter.user_id, "Deletion request failed: {}", e);
            state.audit().try_emit(AuditEvent::DeletionFailed {
                requested_by: caller,
                user_id: filter.user_id.clone(),
                url: filter.url.clone(),
                error: e.to_string(),
            });
            let status = match e {
                PipelineError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
                PipelineError::InvalidConfig(_) | PipelineError::Fetch { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Err(error_reply(status, e.to_string()))
        }
    }
}

/// Query parameters for `GET /deletions/preview`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewParams {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub url: String,
}

/// Count what a deletion would match without enqueueing anything.
pub async fn preview_deletion(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<PreviewResponse>, ErrorReply> {
    let filter = DeletionFilter::new(params.user_id.trim(), params.url.trim());
    require_complete(&filter)?;

    let matching_items = state.list_items().count_matching(&filter).map_err(|e| {
        error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to count list items: {}", e),
        )
    })?;

    Ok(Json(PreviewResponse {
        user_id: filter.user_id,
        url: filter.url,
        matching_items,
    }))
}

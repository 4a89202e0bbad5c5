use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{audit, deletions, handlers};
use super::middleware::{auth_middleware, metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Authenticated API routes
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/audit", get(audit::query_audit))
        .route("/deletions", post(deletions::request_deletion))
        .route("/deletions/preview", get(deletions::preview_deletion))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    // Probes stay open so orchestrators can reach them without credentials
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

use crate::core::state::AppState;
use crate::metrics::collector::unix_timestamp;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where each remote service is reached, as configured.
#[derive(Debug, Serialize, Deserialize)]
pub struct Upstreams {
    pub stage: String,
    pub classroom: String,
    pub assignments: String,
    pub users: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub upstreams: Upstreams,
    /// False when the assignment id cache lives in memory only
    pub cache_durable: bool,
    pub cached_scopes: usize,
    pub open_views: usize,
}

/// GET /health
///
/// Liveness plus the process's own view of its wiring. Upstreams are not
/// contacted.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let services = &state.config.services;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: unix_timestamp(),
            upstreams: Upstreams {
                stage: services.stage.clone(),
                classroom: services.classroom_url.clone(),
                assignments: services.assignments_url.clone(),
                users: services.users_url.clone(),
            },
            cache_durable: state.assignment_cache.is_durable(),
            cached_scopes: state.assignment_cache.scope_count(),
            open_views: state.views.len(),
        }),
    )
}

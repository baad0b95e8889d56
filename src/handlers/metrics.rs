// Metrics endpoint

use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Returns JSON with the dashboard counters:
/// - Classroom loads, degraded loads and their rate
/// - Assignment cache refreshes and cached session scopes
/// - Slug misses and upstream failures
/// - Open views and uptime
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state
        .metrics
        .get_snapshot(&state.assignment_cache, &state.views);

    (StatusCode::OK, Json(snapshot)).into_response()
}

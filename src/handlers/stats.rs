// Learning stats for a classroom and its students

use crate::core::error::DashboardError;
use crate::core::state::AppState;
use crate::handlers::classrooms::resolve_slug;
use crate::pipeline::credential::Session;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// GET /classrooms/{slug}/stats
///
/// Topic error rates and daily progress, ready for charting.
pub async fn classroom_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<Response, DashboardError> {
    let classroom = resolve_slug(&state, &slug, &session).await?;

    state.metrics.increment_stats_loads();
    let stats = state
        .stats
        .load_classroom_stats(&classroom.classroom_id, &session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::OK, Json(stats)).into_response())
}

/// GET /classrooms/{slug}/students/{user_id}/stats
pub async fn student_stats_handler(
    State(state): State<Arc<AppState>>,
    Path((slug, user_id)): Path<(String, String)>,
    session: Session,
) -> Result<Response, DashboardError> {
    let classroom = resolve_slug(&state, &slug, &session).await?;

    state.metrics.increment_stats_loads();
    let stat = state
        .stats
        .load_student_stat(&classroom.classroom_id, &user_id, &session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::OK, Json(stat)).into_response())
}

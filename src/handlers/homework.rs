// Homework authoring and review

use crate::core::error::DashboardError;
use crate::core::state::AppState;
use crate::models::assignment::WellKnownGame;
use crate::models::level::HomeworkDraft;
use crate::pipeline::credential::Session;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// POST /homework
pub async fn create_homework_handler(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(draft): Json<HomeworkDraft>,
) -> Result<Response, DashboardError> {
    let created = state
        .orchestrator
        .create_homework(&session, &draft)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /homework/{game}/levels
pub async fn levels_handler(
    State(state): State<Arc<AppState>>,
    Path(game): Path<String>,
    session: Session,
) -> Result<Response, DashboardError> {
    let game: WellKnownGame = game.parse().map_err(DashboardError::InvalidInput)?;

    let levels = state
        .orchestrator
        .list_levels(&session, game)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::OK, Json(levels)).into_response())
}

/// GET /levels/{level_id}/questions
pub async fn questions_handler(
    State(state): State<Arc<AppState>>,
    Path(level_id): Path<String>,
    session: Session,
) -> Result<Response, DashboardError> {
    let questions = state
        .orchestrator
        .list_questions(&level_id, &session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::OK, Json(questions)).into_response())
}

/// GET /assignment-cache
///
/// Both well-known slots for the session, `null` where nothing is cached.
pub async fn assignment_cache_handler(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Response {
    let entries = state.assignment_cache.entries(&session.scope);
    let slots: BTreeMap<&'static str, Option<String>> = WellKnownGame::ALL
        .into_iter()
        .map(|game| (game.as_str(), entries.get(&game).cloned()))
        .collect();

    (StatusCode::OK, Json(slots)).into_response()
}

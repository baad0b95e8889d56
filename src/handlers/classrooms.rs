// Classroom pages: list, create, open, close, enrol

use crate::core::error::DashboardError;
use crate::core::state::AppState;
use crate::models::classroom::{AssignmentsStatus, Classroom, ClassroomPage};
use crate::models::student::{NewStudent, Student};
use crate::pipeline::credential::Session;
use crate::pipeline::orchestrator::DetailOptions;
use crate::pipeline::slug::to_slug;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct CreateClassroomBody {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewClosed {
    pub success: bool,
    pub closed: bool,
}

/// Where the roster returned after an enrolment came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RosterStatus {
    /// Open view patched in place
    Patched,
    /// No view was open; roster fetched again
    Refetched,
    /// Re-fetch failed; the student exists but `students` is empty
    Unavailable { reason: String },
}

#[derive(Debug, Serialize)]
pub struct StudentAdded {
    pub student: Student,
    /// Roster after enrolment
    pub students: Vec<Student>,
    pub roster_status: RosterStatus,
}

/// Resolve a slug, counting misses and upstream failures.
pub(crate) async fn resolve_slug(
    state: &AppState,
    slug: &str,
    session: &Session,
) -> Result<Classroom, DashboardError> {
    state
        .resolver
        .resolve(slug, &session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))
}

/// GET /classrooms
pub async fn list_classrooms_handler(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, DashboardError> {
    let classrooms = state
        .resolver
        .list(&session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::OK, Json(classrooms)).into_response())
}

/// POST /classrooms
pub async fn create_classroom_handler(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(body): Json<CreateClassroomBody>,
) -> Result<Response, DashboardError> {
    let summary = state
        .orchestrator
        .create_classroom(&body.name, &session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    Ok((StatusCode::CREATED, Json(summary)).into_response())
}

/// GET /classrooms/{slug}
///
/// Resolves the slug, loads roster and assignments, refreshes the session's
/// assignment id cache and records the result as the open view.
pub async fn classroom_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<Response, DashboardError> {
    let classroom = resolve_slug(&state, &slug, &session).await?;
    let ticket = state.views.begin(&session.scope, &classroom.classroom_id);

    state.metrics.increment_classroom_loads();
    let detail = state
        .orchestrator
        .load_classroom_detail(&classroom.classroom_id, &session, DetailOptions::full())
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    match &detail.assignments_status {
        AssignmentsStatus::Fresh => state.metrics.increment_cache_refreshes(),
        AssignmentsStatus::Unavailable { .. } => state.metrics.increment_degraded(),
        AssignmentsStatus::Skipped => {}
    }

    if !state.views.complete(&ticket, detail.clone()) {
        debug!(
            scope = %session.scope,
            classroom_id = %classroom.classroom_id,
            "View closed or superseded, result not kept"
        );
    }

    let page = ClassroomPage {
        slug: to_slug(&classroom.name),
        name: classroom.name,
        detail,
    };

    Ok((StatusCode::OK, Json(page)).into_response())
}

/// GET /classrooms/{slug}/view
///
/// The detail last applied to the session's open view, without calling the
/// remote services again.
pub async fn view_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<Response, DashboardError> {
    let classroom = resolve_slug(&state, &slug, &session).await?;

    let detail = state
        .views
        .current(&session.scope, &classroom.classroom_id)
        .ok_or_else(|| DashboardError::NotFound(format!("No open view for class '{}'", classroom.name)))?;

    let page = ClassroomPage {
        slug: to_slug(&classroom.name),
        name: classroom.name,
        detail,
    };

    Ok((StatusCode::OK, Json(page)).into_response())
}

/// DELETE /classrooms/{slug}/view
pub async fn close_view_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<Response, DashboardError> {
    let classroom = resolve_slug(&state, &slug, &session).await?;
    let closed = state.views.close(&session.scope, &classroom.classroom_id);

    Ok((
        StatusCode::OK,
        Json(ViewClosed {
            success: true,
            closed,
        }),
    )
        .into_response())
}

/// POST /classrooms/{slug}/students
///
/// Enrols the student, then patches the open view's roster. Without an open
/// view the roster is fetched again; once the student exists a failed
/// re-fetch only marks the roster unavailable.
pub async fn add_student_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    session: Session,
    Json(body): Json<NewStudent>,
) -> Result<Response, DashboardError> {
    let classroom = resolve_slug(&state, &slug, &session).await?;

    let student = state
        .orchestrator
        .add_student(&classroom.classroom_id, &body, &session.credential)
        .await
        .inspect_err(|e| state.metrics.record_error(e))?;

    let (students, roster_status) =
        match state
            .views
            .patch_roster(&session.scope, &classroom.classroom_id, student.clone())
        {
            Some(detail) => (detail.students, RosterStatus::Patched),
            None => match state
                .orchestrator
                .load_classroom_detail(&classroom.classroom_id, &session, DetailOptions::roster_only())
                .await
            {
                Ok(detail) => (detail.students, RosterStatus::Refetched),
                Err(e) => {
                    state.metrics.record_error(&e);
                    warn!(
                        classroom_id = %classroom.classroom_id,
                        user_id = %student.user_id,
                        error = %e,
                        "Roster re-fetch failed after enrolment"
                    );
                    (
                        Vec::new(),
                        RosterStatus::Unavailable {
                            reason: e.to_string(),
                        },
                    )
                }
            },
        };

    info!(
        classroom_id = %classroom.classroom_id,
        roster = students.len(),
        roster_status = ?roster_status,
        "Roster updated after enrolment"
    );

    Ok((
        StatusCode::CREATED,
        Json(StudentAdded {
            student,
            students,
            roster_status,
        }),
    )
        .into_response())
}

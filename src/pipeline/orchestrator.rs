use crate::api::client::Services;
use crate::core::error::DashboardError;
use crate::models::assignment::{Assignment, NewAssignment, WellKnownGame};
use crate::models::classroom::{AssignmentsStatus, ClassroomDetail, ClassroomSummary};
use crate::models::level::{CreatedHomework, CustomLevel, CustomQuestion, HomeworkDraft, NewCustomLevel};
use crate::models::student::{NewStudent, Student};
use crate::pipeline::credential::{Credential, Session};
use crate::pipeline::slug::to_slug;
use crate::stores::assignment_cache::AssignmentIdCache;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct DetailOptions {
    pub include_assignments: bool,
}

impl DetailOptions {
    pub fn full() -> Self {
        Self {
            include_assignments: true,
        }
    }

    pub fn roster_only() -> Self {
        Self {
            include_assignments: false,
        }
    }
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self::full()
    }
}

/// Fans out to the remote services for one classroom and merges the answers.
///
/// The roster is mandatory and the assignments are best-effort: a failed
/// assignment fetch degrades the detail instead of failing it. Nothing is
/// memoized here; every call re-queries the services.
#[derive(Clone)]
pub struct ResourceOrchestrator {
    services: Arc<Services>,
    cache: Arc<AssignmentIdCache>,
}

impl ResourceOrchestrator {
    pub fn new(services: Arc<Services>, cache: Arc<AssignmentIdCache>) -> Self {
        Self { services, cache }
    }

    pub async fn load_classroom_detail(
        &self,
        classroom_id: &str,
        session: &Session,
        options: DetailOptions,
    ) -> Result<ClassroomDetail, DashboardError> {
        let credential = &session.credential;
        let roster = self.services.classroom.roster(classroom_id, credential);

        let (students, assignments) = if options.include_assignments {
            let assignments = self
                .services
                .assignments
                .list_for_classroom(classroom_id, credential);
            let (students, assignments) = tokio::join!(roster, assignments);
            (students, Some(assignments))
        } else {
            (roster.await, None)
        };

        let students = students?;

        let (assignments, assignments_status) = match assignments {
            None => (Vec::new(), AssignmentsStatus::Skipped),
            Some(Ok(assignments)) => {
                self.refresh_cache(&session.scope, &assignments);
                (assignments, AssignmentsStatus::Fresh)
            }
            Some(Err(e)) => {
                let degraded = DashboardError::PartialDataUnavailable(format!(
                    "Assignments unavailable: {}",
                    e
                ));
                warn!(
                    classroom_id = classroom_id,
                    error = %e,
                    "Assignment fetch failed, serving roster only"
                );
                (
                    Vec::new(),
                    AssignmentsStatus::Unavailable {
                        reason: degraded.to_string(),
                    },
                )
            }
        };

        info!(
            classroom_id = classroom_id,
            students = students.len(),
            assignments = assignments.len(),
            "Classroom detail loaded"
        );

        Ok(ClassroomDetail {
            classroom_id: classroom_id.to_string(),
            students,
            assignments,
            assignments_status,
        })
    }

    /// Create a classroom and the default assignment every classroom owns.
    pub async fn create_classroom(
        &self,
        name: &str,
        credential: &Credential,
    ) -> Result<ClassroomSummary, DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidInput(
                "Classroom name is required".to_string(),
            ));
        }

        let classroom = self.services.classroom.create(name, credential).await?;

        let assignment_id = self
            .services
            .assignments
            .create(
                &NewAssignment {
                    classroom_id: &classroom.classroom_id,
                    game_name: &classroom.classroom_id,
                    level_ids: Vec::new(),
                },
                credential,
            )
            .await?;

        info!(
            classroom_id = %classroom.classroom_id,
            assignment_id = assignment_id.as_deref().unwrap_or(""),
            "Classroom created"
        );

        let slug = to_slug(&classroom.name);
        Ok(ClassroomSummary::from_classroom(&classroom, slug))
    }

    pub async fn add_student(
        &self,
        classroom_id: &str,
        student: &NewStudent,
        credential: &Credential,
    ) -> Result<Student, DashboardError> {
        let student = student.normalized().map_err(DashboardError::InvalidInput)?;

        let created = self
            .services
            .users
            .create_student(classroom_id, &student, credential)
            .await?;

        info!(
            classroom_id = classroom_id,
            user_id = %created.user_id,
            "Student enrolled"
        );
        Ok(created)
    }

    /// Author a custom level with its questions under the cached assignment
    /// of the draft's game.
    pub async fn create_homework(
        &self,
        session: &Session,
        draft: &HomeworkDraft,
    ) -> Result<CreatedHomework, DashboardError> {
        let draft = draft.validated().map_err(DashboardError::InvalidInput)?;
        let assignment_id = self.cached_assignment(&session.scope, draft.game)?;

        let level_id = self
            .services
            .assignments
            .create_level(
                &NewCustomLevel {
                    assignment_id: &assignment_id,
                    game_type: draft.game.as_str(),
                    name: &draft.name,
                    description: &draft.description,
                    questions_ids: Vec::new(),
                },
                &session.credential,
            )
            .await?;

        let questions = draft.to_questions(&level_id);
        self.services
            .assignments
            .create_questions(&questions, &session.credential)
            .await?;

        info!(
            assignment_id = %assignment_id,
            level_id = %level_id,
            questions = questions.len(),
            "Homework created"
        );

        Ok(CreatedHomework {
            level_id,
            assignment_id,
            questions_created: questions.len(),
            topics: draft.topics(),
        })
    }

    pub async fn list_levels(
        &self,
        session: &Session,
        game: WellKnownGame,
    ) -> Result<Vec<CustomLevel>, DashboardError> {
        let assignment_id = self.cached_assignment(&session.scope, game)?;
        self.services
            .assignments
            .levels_for_assignment(&assignment_id, &session.credential)
            .await
    }

    pub async fn list_questions(
        &self,
        level_id: &str,
        credential: &Credential,
    ) -> Result<Vec<CustomQuestion>, DashboardError> {
        self.services
            .assignments
            .questions_for_level(level_id, credential)
            .await
    }

    fn refresh_cache(&self, scope: &str, assignments: &[Assignment]) {
        let entries = AssignmentIdCache::well_known_entries(assignments);
        let count = entries.len();
        let changed = self.cache.replace_well_known_entries(scope, entries);
        debug!(scope = scope, entries = count, changed = changed, "Assignment cache refreshed");
    }

    fn cached_assignment(&self, scope: &str, game: WellKnownGame) -> Result<String, DashboardError> {
        self.cache.get(scope, game).ok_or_else(|| {
            DashboardError::NotFound(format!(
                "No {} assignment known for this session; open the classroom first",
                game
            ))
        })
    }
}

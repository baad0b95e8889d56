use crate::api::client::{path_id, ServiceClient};
use crate::core::error::DashboardError;
use crate::models::assignment::{Assignment, CreatedAssignment, NewAssignment};
use crate::models::level::{CreatedLevel, CustomLevel, CustomQuestion, LevelList, NewCustomLevel, QuestionList};
use crate::models::stats::{StudentStatsCollection, TopicErrorStat};
use crate::pipeline::credential::Credential;
use serde::de::IgnoredAny;
use serde::Deserialize;

/// Assignment service: assignments, authored content and learning stats.
#[derive(Clone)]
pub struct AssignmentService {
    client: ServiceClient,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssignmentsBody {
    List(Vec<Assignment>),
    Wrapped {
        assignments: Vec<Assignment>,
    },
}

impl AssignmentService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub async fn list_for_classroom(
        &self,
        classroom_id: &str,
        credential: &Credential,
    ) -> Result<Vec<Assignment>, DashboardError> {
        let path = format!("assignments/classroom/{}", path_id(classroom_id)?);
        let body: AssignmentsBody = self.client.get_json(&path, credential).await?;

        Ok(match body {
            AssignmentsBody::List(assignments) => assignments,
            AssignmentsBody::Wrapped { assignments } => assignments,
        })
    }

    pub async fn create(
        &self,
        assignment: &NewAssignment<'_>,
        credential: &Credential,
    ) -> Result<Option<String>, DashboardError> {
        let created: CreatedAssignment = self.client.post_json("assignments", assignment, credential).await?;
        Ok(created.assignment_id)
    }

    pub async fn create_level(
        &self,
        level: &NewCustomLevel<'_>,
        credential: &Credential,
    ) -> Result<String, DashboardError> {
        let created: CreatedLevel = self.client.post_json("custom-levels", level, credential).await?;
        Ok(created.level_id)
    }

    pub async fn levels_for_assignment(
        &self,
        assignment_id: &str,
        credential: &Credential,
    ) -> Result<Vec<CustomLevel>, DashboardError> {
        let path = format!("custom-levels/assignment/{}", path_id(assignment_id)?);
        let list: LevelList = self.client.get_json(&path, credential).await?;
        Ok(list.custom_levels)
    }

    pub async fn create_questions(
        &self,
        questions: &[CustomQuestion],
        credential: &Credential,
    ) -> Result<(), DashboardError> {
        // Only the status matters; the body shape is not relied on
        let _: IgnoredAny = self.client.post_json("custom-questions", questions, credential).await?;
        Ok(())
    }

    pub async fn questions_for_level(
        &self,
        level_id: &str,
        credential: &Credential,
    ) -> Result<Vec<CustomQuestion>, DashboardError> {
        let path = format!("custom-levels/{}/questions", path_id(level_id)?);
        let list: QuestionList = self.client.get_json(&path, credential).await?;
        Ok(list.questions)
    }

    pub async fn topic_errors(
        &self,
        classroom_id: &str,
        credential: &Credential,
    ) -> Result<Vec<TopicErrorStat>, DashboardError> {
        let path = format!("topics/errors/{}", path_id(classroom_id)?);
        self.client.get_json(&path, credential).await
    }

    pub async fn student_stats(
        &self,
        classroom_id: &str,
        credential: &Credential,
    ) -> Result<StudentStatsCollection, DashboardError> {
        let path = format!("stats/{}", path_id(classroom_id)?);
        self.client.get_json(&path, credential).await
    }
}

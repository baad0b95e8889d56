use crate::api::client::{path_id, ServiceClient};
use crate::core::error::DashboardError;
use crate::models::classroom::{Classroom, NewClassroom};
use crate::models::stats::ClassroomStatsSummary;
use crate::models::student::Student;
use crate::pipeline::credential::Credential;
use serde::Deserialize;

/// Classroom service: classrooms, rosters and classroom-level stats.
#[derive(Clone)]
pub struct ClassroomService {
    client: ServiceClient,
}

#[derive(Debug, Deserialize)]
struct CreatedClassroom {
    classroom_id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Roster endpoints answer with either a bare array or `{ "students": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterBody {
    List(Vec<Student>),
    Wrapped {
        students: Vec<Student>,
    },
}

impl ClassroomService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Every classroom owned by the teacher behind `credential`.
    pub async fn list_for_teacher(&self, credential: &Credential) -> Result<Vec<Classroom>, DashboardError> {
        self.client.get_json("classrooms/teacher", credential).await
    }

    pub async fn create(&self, name: &str, credential: &Credential) -> Result<Classroom, DashboardError> {
        let created: CreatedClassroom = self
            .client
            .post_json("classrooms/create", &NewClassroom { name }, credential)
            .await?;

        Ok(Classroom {
            classroom_id: created.classroom_id,
            name: created.name.unwrap_or_else(|| name.to_string()),
            students: Vec::new(),
        })
    }

    pub async fn roster(&self, classroom_id: &str, credential: &Credential) -> Result<Vec<Student>, DashboardError> {
        let path = format!("classrooms/{}/students", path_id(classroom_id)?);
        let body: RosterBody = self.client.get_json(&path, credential).await?;

        Ok(match body {
            RosterBody::List(students) => students,
            RosterBody::Wrapped { students } => students,
        })
    }

    pub async fn stats(
        &self,
        classroom_id: &str,
        credential: &Credential,
    ) -> Result<ClassroomStatsSummary, DashboardError> {
        let path = format!("classroom/stats/{}", path_id(classroom_id)?);
        self.client.get_json(&path, credential).await
    }
}

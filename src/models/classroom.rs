use crate::models::assignment::Assignment;
use crate::models::student::Student;
use serde::{Deserialize, Deserializer, Serialize};

/// A classroom as held by the classroom service.
///
/// `classroom_id` is the identity and never changes; `name` may be renamed
/// upstream at any time, so slugs derived from it are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub classroom_id: String,
    pub name: String,
    /// Ordered roster references
    #[serde(default, deserialize_with = "deserialize_student_refs")]
    pub students: Vec<String>,
}

/// The classroom service returns the roster either as bare ids or as
/// embedded student records depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum StudentRef {
    Id(String),
    Record { user_id: String },
}

fn deserialize_student_refs<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<StudentRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs
        .into_iter()
        .map(|r| match r {
            StudentRef::Id(id) => id,
            StudentRef::Record { user_id } => user_id,
        })
        .collect())
}

/// Dashboard card entry: a classroom plus the slug used to link to it.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomSummary {
    pub classroom_id: String,
    pub name: String,
    pub slug: String,
    pub student_count: usize,
}

impl ClassroomSummary {
    pub fn from_classroom(classroom: &Classroom, slug: String) -> Self {
        Self {
            classroom_id: classroom.classroom_id.clone(),
            name: classroom.name.clone(),
            slug,
            student_count: classroom.students.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewClassroom<'a> {
    pub name: &'a str,
}

/// Whether the assignment half of a classroom load produced usable data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentsStatus {
    /// Assignments fetched in this load; the id cache was refreshed from them
    Fresh,
    /// Assignment fetch failed; list is empty and the id cache was left alone
    Unavailable { reason: String },
    /// Caller did not ask for assignments
    Skipped,
}

/// Merged view of one classroom: roster plus (best-effort) assignments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassroomDetail {
    pub classroom_id: String,
    pub students: Vec<Student>,
    pub assignments: Vec<Assignment>,
    pub assignments_status: AssignmentsStatus,
}

/// Response for the classroom page: the resolved classroom and its detail.
/// The id comes from the flattened detail.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomPage {
    pub name: String,
    pub slug: String,
    #[serde(flatten)]
    pub detail: ClassroomDetail,
}

use crate::api::classroom::ClassroomService;
use crate::core::error::DashboardError;
use crate::models::classroom::{Classroom, ClassroomSummary};
use crate::pipeline::credential::Credential;
use crate::pipeline::slug::{name_from_slug, to_slug};
use tracing::{debug, info};

/// Maps a URL slug back to the classroom it was derived from.
#[derive(Clone)]
pub struct ClassroomResolver {
    classrooms: ClassroomService,
}

impl ClassroomResolver {
    pub fn new(classrooms: ClassroomService) -> Self {
        Self { classrooms }
    }

    /// Fetch the teacher's classrooms and return the first whose name slugs
    /// to `slug`.
    ///
    /// A failed list call is `FetchFailed`; a successful list without a match
    /// (including an empty one) is `NotFound`.
    pub async fn resolve(&self, slug: &str, credential: &Credential) -> Result<Classroom, DashboardError> {
        let wanted = to_slug(slug);
        let classrooms = self.classrooms.list_for_teacher(credential).await?;
        let candidates = classrooms.len();

        match classrooms.into_iter().find(|c| to_slug(&c.name) == wanted) {
            Some(classroom) => {
                debug!(
                    slug = %wanted,
                    classroom_id = %classroom.classroom_id,
                    "Slug resolved"
                );
                Ok(classroom)
            }
            None => {
                info!(slug = %wanted, candidates = candidates, "No classroom matches slug");
                Err(DashboardError::NotFound(format!(
                    "Class '{}' not found",
                    name_from_slug(&wanted)
                )))
            }
        }
    }

    /// The teacher's classrooms with the slugs used to link to them.
    pub async fn list(&self, credential: &Credential) -> Result<Vec<ClassroomSummary>, DashboardError> {
        let classrooms = self.classrooms.list_for_teacher(credential).await?;

        Ok(classrooms
            .iter()
            .map(|c| ClassroomSummary::from_classroom(c, to_slug(&c.name)))
            .collect())
    }
}

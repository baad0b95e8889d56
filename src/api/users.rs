use crate::api::client::ServiceClient;
use crate::core::error::DashboardError;
use crate::models::student::{NewStudent, Student};
use crate::pipeline::credential::Credential;

/// Users service: account creation for students.
#[derive(Clone)]
pub struct UserService {
    client: ServiceClient,
}

impl UserService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Create a student account enrolled in `classroom_id`.
    pub async fn create_student(
        &self,
        classroom_id: &str,
        student: &NewStudent,
        credential: &Credential,
    ) -> Result<Student, DashboardError> {
        self.client
            .post_json("auth/create-student", &student.to_request(classroom_id), credential)
            .await
    }
}

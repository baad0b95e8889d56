use serde::{Deserialize, Serialize};

/// A student enrolled in exactly one classroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "lastName", alias = "last_name")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub dni: String,
    #[serde(
        default,
        rename = "chosenSkin",
        alias = "chosen_skin",
        skip_serializing_if = "Option::is_none"
    )]
    pub chosen_skin: Option<String>,
}

/// Enrolment form as submitted by the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    #[serde(rename = "lastName", alias = "last_name")]
    pub last_name: String,
    pub dni: String,
    pub email: String,
}

/// Payload for the users service `auth/create-student` call.
#[derive(Debug, Serialize)]
pub struct CreateStudentRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "lastName")]
    pub last_name: &'a str,
    pub dni: &'a str,
    pub email: &'a str,
    pub classroom_id: &'a str,
}

impl NewStudent {
    /// Trim every field; all four are mandatory.
    pub fn normalized(&self) -> Result<NewStudent, String> {
        let student = NewStudent {
            name: self.name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            dni: self.dni.trim().to_string(),
            email: self.email.trim().to_string(),
        };

        if student.name.is_empty()
            || student.last_name.is_empty()
            || student.dni.is_empty()
            || student.email.is_empty()
        {
            return Err("name, lastName, dni and email are all required".to_string());
        }

        Ok(student)
    }

    pub fn to_request<'a>(&'a self, classroom_id: &'a str) -> CreateStudentRequest<'a> {
        CreateStudentRequest {
            name: &self.name,
            last_name: &self.last_name,
            dni: &self.dni,
            email: &self.email,
            classroom_id,
        }
    }
}

use database::services::user::UserProfile;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub user_type: String,
    pub lab_id: Option<i32>,
    pub lab_name: Option<String>,
    pub dept: Option<String>,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        let user_type = profile.user_type().to_string();
        let lab_id = profile.lab_id();

        match profile {
            UserProfile::Student(student) => Self {
                id: student.id,
                name: student.name,
                user_type,
                lab_id,
                lab_name: student.lab_name,
                dept: Some(student.dept),
            },
            UserProfile::Teacher(teacher) => Self {
                id: teacher.id,
                name: teacher.name,
                user_type,
                lab_id,
                lab_name: None,
                dept: teacher.dept,
            },
            UserProfile::Admin(admin) => Self {
                id: admin.id,
                name: admin.name,
                user_type,
                lab_id,
                lab_name: None,
                dept: None,
            },
        }
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::content::Difficulty;
use crate::models::question::QuestionCategory;
use crate::models::role::Role;
use crate::models::user::{User, UserSummary};
use crate::services::admin_scope::ModuleAccess;

/// Empty strings clear optional media fields.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilters {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub question_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminIndex {
    pub user: UserSummary,
    pub role: Role,
    pub modules: Vec<ModuleAccess>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CoursePayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub pdf_file: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CoursePatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub image: Option<String>,
    pub pdf_file: Option<String>,
    pub order: Option<i32>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MemePayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MemePatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InlineAnswer {
    #[validate(length(min = 1, max = 200))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionPayload {
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, max = 100, message = "Points must be between 1 and 100"))]
    pub points: i32,
    #[serde(default)]
    pub category: QuestionCategory,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<InlineAnswer>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionPatch {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub image: Option<String>,
    #[validate(range(min = 1, max = 100, message = "Points must be between 1 and 100"))]
    pub points: Option<i32>,
    pub category: Option<QuestionCategory>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerPayload {
    pub question_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AnswerPatch {
    pub question_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub text: Option<String>,
    pub is_correct: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserPayload {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub password: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GroupPayload {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub role: Role,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        let role = user.role();
        Self { user, role }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedUser {
    pub user: UserRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
}

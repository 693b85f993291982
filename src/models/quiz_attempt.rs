use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const GENERAL_CATEGORY: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub category: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub user_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub category: String,
    pub completed_at: DateTime<Utc>,
}

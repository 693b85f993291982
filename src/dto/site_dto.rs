use serde::Serialize;

use crate::models::content::{Course, Meme};
use crate::models::quiz_attempt::QuizAttempt;
use crate::models::user::UserSummary;

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub user: UserSummary,
    pub courses: Vec<Course>,
    pub memes: Vec<Meme>,
    pub total_quizzes: usize,
    pub best_attempt: Option<QuizAttempt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemesPage {
    pub memes: Vec<Meme>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetailPage {
    pub course: Course,
    pub has_pdf: bool,
    pub pdf_url: Option<String>,
    pub related_courses: Vec<Course>,
}

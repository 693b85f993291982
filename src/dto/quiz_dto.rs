use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::question::{QuestionCategory, QuestionWithAnswers};
use crate::models::quiz_attempt::QuizAttempt;
use crate::models::user::UserSummary;
use crate::utils::validation::FormErrors;

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentedQuestion {
    pub id: i64,
    pub field: String,
    pub text: String,
    pub image: Option<String>,
    pub points: i32,
    pub category: QuestionCategory,
    pub required: bool,
    pub choices: Vec<Choice>,
}

impl From<&QuestionWithAnswers> for PresentedQuestion {
    fn from(q: &QuestionWithAnswers) -> Self {
        Self {
            id: q.question.id,
            field: format!("question_{}", q.question.id),
            text: q.question.text.clone(),
            image: q.question.image.clone(),
            points: q.question.points,
            category: q.question.category,
            required: true,
            choices: q
                .answers
                .iter()
                .map(|a| Choice {
                    id: a.id,
                    text: a.text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizPage {
    pub ticket: String,
    pub total_questions: usize,
    pub questions: Vec<PresentedQuestion>,
    pub selected: BTreeMap<String, String>,
    pub errors: FormErrors,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResultPage {
    pub attempt_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub attempts: Vec<QuizAttempt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub user: UserSummary,
    pub total_quizzes: usize,
    pub average_score: f64,
    pub best_attempt: Option<QuizAttempt>,
    pub recent_attempts: Vec<QuizAttempt>,
}

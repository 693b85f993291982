use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::models::question::QuestionWithAnswers;
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt, GENERAL_CATEGORY};
use crate::repositories::{AttemptRepository, QuestionRepository};
use crate::services::grading_service::{GradedQuiz, GradingService};
use crate::services::sampler::{select_questions, QuestionSampler};
use crate::utils::jwt::JwtKeys;
use crate::utils::time::{minutes_from_now, now, unix_seconds};
use crate::utils::validation::{FormErrors, INVALID_CHOICE, REQUIRED};

pub const TICKET_FIELD: &str = "ticket";
pub const QUIZ_TICKET_TYPE: &str = "quiz_ticket";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketClaims {
    pub sub: String,
    pub typ: String,
    pub questions: Vec<i64>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct QuizSheet {
    pub ticket: String,
    pub questions: Vec<QuestionWithAnswers>,
}

#[derive(Debug, Clone)]
pub struct QuizResult {
    pub attempt: QuizAttempt,
    pub graded: GradedQuiz,
}

#[derive(Debug)]
pub enum Submission {
    Completed(QuizResult),
    Invalid { sheet: QuizSheet, errors: FormErrors },
    /// Ticket missing, expired, issued to someone else, or its questions changed.
    Stale,
}

pub fn field_name(question_id: i64) -> String {
    format!("question_{}", question_id)
}

#[derive(Clone)]
pub struct QuizService {
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    sampler: Arc<dyn QuestionSampler>,
    jwt: JwtKeys,
    ticket_ttl_minutes: i64,
}

impl QuizService {
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        sampler: Arc<dyn QuestionSampler>,
        config: &Config,
    ) -> Self {
        Self {
            questions,
            attempts,
            sampler,
            jwt: JwtKeys::new(&config.jwt_secret),
            ticket_ttl_minutes: config.quiz_ticket_ttl_minutes,
        }
    }

    pub async fn start(&self, user_id: i64) -> Result<Option<QuizSheet>> {
        let pool = self.questions.list_questions_with_answers().await?;
        if pool.is_empty() {
            return Ok(None);
        }
        let questions = select_questions(self.sampler.as_ref(), pool);

        let claims = TicketClaims {
            sub: user_id.to_string(),
            typ: QUIZ_TICKET_TYPE.to_string(),
            questions: questions.iter().map(|q| q.question.id).collect(),
            exp: unix_seconds(minutes_from_now(self.ticket_ttl_minutes)),
        };
        let ticket = self.jwt.sign(&claims)?;
        tracing::debug!(user_id, presented = questions.len(), "quiz started");

        Ok(Some(QuizSheet { ticket, questions }))
    }

    /// `form` keeps every submitted pair in order, so repeated fields stay visible.
    pub async fn submit(&self, user_id: i64, form: &[(String, String)]) -> Result<Submission> {
        let [ticket] = form_values(form, TICKET_FIELD)[..] else {
            return Ok(Submission::Stale);
        };
        let ticket = ticket.trim().to_string();
        let claims: TicketClaims = match self.jwt.verify(&ticket) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::info!(user_id, error = %err, "rejected quiz ticket");
                return Ok(Submission::Stale);
            }
        };
        if claims.typ != QUIZ_TICKET_TYPE
            || claims.sub != user_id.to_string()
            || claims.questions.is_empty()
        {
            return Ok(Submission::Stale);
        }

        let mut questions = self
            .questions
            .find_questions_with_answers(&claims.questions)
            .await?;
        if questions.len() != claims.questions.len() {
            return Ok(Submission::Stale);
        }
        questions.sort_by_key(|q| {
            claims
                .questions
                .iter()
                .position(|id| *id == q.question.id)
                .unwrap_or(usize::MAX)
        });

        let (selections, errors) = read_selections(&questions, form);
        if !errors.is_empty() {
            return Ok(Submission::Invalid {
                sheet: QuizSheet { ticket, questions },
                errors,
            });
        }

        let graded = GradingService::grade(&questions, &selections);
        let attempt = self
            .attempts
            .insert_attempt(NewQuizAttempt {
                user_id,
                score: graded.score,
                total_questions: graded.total_questions,
                category: GENERAL_CATEGORY.to_string(),
                completed_at: now(),
            })
            .await?;
        tracing::info!(
            user_id,
            attempt_id = attempt.id,
            score = graded.score,
            total_questions = graded.total_questions,
            "quiz attempt recorded"
        );

        Ok(Submission::Completed(QuizResult { attempt, graded }))
    }
}

fn form_values<'a>(form: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    form.iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Every presented question needs exactly one answer drawn from its own answer set.
fn read_selections(
    questions: &[QuestionWithAnswers],
    form: &[(String, String)],
) -> (HashMap<i64, i64>, FormErrors) {
    let mut selections = HashMap::new();
    let mut errors = FormErrors::default();

    for q in questions {
        let field = field_name(q.question.id);
        let raw = match form_values(form, &field)[..] {
            [] => {
                errors.add(field, REQUIRED);
                continue;
            }
            [single] => single,
            _ => {
                errors.add(field, INVALID_CHOICE);
                continue;
            }
        };
        match raw.parse::<i64>().ok().filter(|id| q.answer(*id).is_some()) {
            Some(answer_id) => {
                selections.insert(q.question.id, answer_id);
            }
            None => errors.add(field, INVALID_CHOICE),
        }
    }

    (selections, errors)
}

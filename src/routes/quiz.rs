use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension, Form,
};

use crate::dto::quiz_dto::{HistoryPage, PresentedQuestion, ProfilePage, QuizPage, QuizResultPage};
use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserSummary;
use crate::services::quiz_service::{QuizSheet, Submission};
use crate::utils::flash::{Flash, Level};
use crate::utils::validation::FormErrors;
use crate::AppState;

const NO_QUESTIONS: &str = "There are no quiz questions available yet.";
const STALE_QUIZ: &str = "That quiz is no longer valid. Here is a fresh one.";
const QUIZ_PATH: &str = "/quiz/";

fn quiz_page(sheet: QuizSheet, selected: BTreeMap<String, String>, errors: FormErrors) -> QuizPage {
    QuizPage {
        ticket: sheet.ticket,
        total_questions: sheet.questions.len(),
        questions: sheet.questions.iter().map(PresentedQuestion::from).collect(),
        selected,
        errors,
    }
}

pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    flash: Flash,
) -> Result<Response> {
    let Some(sheet) = state.quiz_service.start(user.id).await? else {
        return Ok(flash.with(Level::Info, NO_QUESTIONS).redirect("/"));
    };
    Ok(flash.render(
        StatusCode::OK,
        "quiz",
        quiz_page(sheet, BTreeMap::new(), FormErrors::default()),
    ))
}

pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    flash: Flash,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response> {
    match state.quiz_service.submit(user.id, &form).await? {
        Submission::Completed(result) => {
            let percentage = result.graded.percentage();
            Ok(flash.render(
                StatusCode::OK,
                "quiz_result",
                QuizResultPage {
                    attempt_id: result.attempt.id,
                    score: result.attempt.score,
                    total_questions: result.attempt.total_questions,
                    max_score: result.graded.max_score,
                    percentage,
                    category: result.attempt.category,
                },
            ))
        }
        Submission::Invalid { sheet, errors } => {
            let selected = form
                .into_iter()
                .filter(|(key, _)| key.starts_with("question_"))
                .collect();
            Ok(flash.render(StatusCode::BAD_REQUEST, "quiz", quiz_page(sheet, selected, errors)))
        }
        Submission::Stale => Ok(flash.with(Level::Warning, STALE_QUIZ).redirect(QUIZ_PATH)),
    }
}

pub async fn history(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    flash: Flash,
) -> Result<Response> {
    let attempts = state.attempt_service.history(user.id).await?;
    Ok(flash.render(StatusCode::OK, "quiz_history", HistoryPage { attempts }))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    flash: Flash,
) -> Result<Response> {
    let stats = state.attempt_service.stats(user.id).await?;
    Ok(flash.render(
        StatusCode::OK,
        "profile",
        ProfilePage {
            user: UserSummary::from(&user),
            total_quizzes: stats.total_quizzes,
            average_score: stats.average_score,
            best_attempt: stats.best_attempt,
            recent_attempts: stats.recent_attempts,
        },
    ))
}

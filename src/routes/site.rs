use axum::{extract::State, http::StatusCode, response::Response, Extension};

use crate::dto::site_dto::{HomePage, MemesPage};
use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserSummary;
use crate::utils::flash::Flash;
use crate::AppState;

pub async fn home(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    flash: Flash,
) -> Result<Response> {
    let courses = state.content_service.courses().await?;
    let memes = state.content_service.latest_memes().await?;
    let stats = state.attempt_service.stats(user.id).await?;

    Ok(flash.render(
        StatusCode::OK,
        "home",
        HomePage {
            user: UserSummary::from(&user),
            courses,
            memes,
            total_quizzes: stats.total_quizzes,
            best_attempt: stats.best_attempt,
        },
    ))
}

pub async fn memes(State(state): State<AppState>, flash: Flash) -> Result<Response> {
    let memes = state.content_service.memes().await?;
    Ok(flash.render(StatusCode::OK, "memes", MemesPage { memes }))
}

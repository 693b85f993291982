pub mod admin;
pub mod auth;
pub mod course;
pub mod health;
pub mod quiz;
pub mod site;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::{front_end_gate, require_admin};
use crate::middleware::rate_limit::{new_rps_state, rps_middleware};
use crate::AppState;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let front_end = Router::new()
        .route("/", get(site::home))
        .route("/memes/", get(site::memes))
        .route("/course/:id/", get(course::course_detail))
        .route("/course/:id/pdf/", get(course::course_pdf))
        .route("/quiz/", get(quiz::start_quiz).post(quiz::submit_quiz))
        .route("/quiz/history/", get(quiz::history))
        .route("/profile/", get(quiz::profile))
        .route_layer(from_fn_with_state(state.clone(), front_end_gate));

    let accounts = Router::new()
        .route("/register/", get(auth::register_page).post(auth::register))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/accounts/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout).post(auth::logout))
        .route("/admin/login/", post(admin::admin_login))
        .layer(from_fn_with_state(
            new_rps_state(state.config.auth_rps),
            rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/admin/", get(admin::index))
        .route(
            "/admin/:record/",
            get(admin::list_records).post(admin::create_record),
        )
        .route(
            "/admin/:record/:id/",
            get(admin::view_record)
                .patch(admin::update_record)
                .delete(admin::delete_record),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health::health))
        .merge(front_end)
        .merge(accounts)
        .merge(admin_api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

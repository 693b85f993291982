use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Form,
};

use crate::dto::auth_dto::{LoginForm, LoginPage, LoginQuery, RegisterForm, RegisterPage};
use crate::error::Result;
use crate::models::session::Session;
use crate::services::access_gate::{safe_next, HOME_PATH, LOGIN_PATH};
use crate::services::auth_service::{LoginOutcome, Registration, INVALID_CREDENTIALS};
use crate::utils::cookies::{clear_cookie, read_cookie, set_cookie, SESSION_COOKIE};
use crate::utils::flash::{Flash, Level};
use crate::utils::validation::FormErrors;
use crate::AppState;

fn with_session_cookie(state: &AppState, mut response: Response, session: &Session) -> Response {
    let cookie = set_cookie(
        SESSION_COOKIE,
        &session.key,
        Some(state.auth_service.session_ttl_secs()),
        state.config.cookie_secure,
    );
    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

async fn drop_previous_session(state: &AppState, headers: &HeaderMap) -> Result<()> {
    if let Some(key) = read_cookie(headers, SESSION_COOKIE) {
        state.auth_service.end_session(&key).await?;
    }
    Ok(())
}

pub async fn register_page(flash: Flash) -> Response {
    flash.render(
        StatusCode::OK,
        "register",
        RegisterPage {
            form: RegisterForm::default(),
            errors: FormErrors::default(),
        },
    )
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    flash: Flash,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    match state.auth_service.register(&form).await? {
        Registration::Invalid(errors) => Ok(flash.render(
            StatusCode::BAD_REQUEST,
            "register",
            RegisterPage { form, errors },
        )),
        Registration::Registered { user, session } => {
            drop_previous_session(&state, &headers).await?;
            let response = flash
                .with(
                    Level::Success,
                    format!("Your account was created. Welcome to Porsche School, {}!", user.first_name),
                )
                .redirect(HOME_PATH);
            Ok(with_session_cookie(&state, response, &session))
        }
    }
}

pub async fn login_page(Query(query): Query<LoginQuery>, flash: Flash) -> Response {
    flash.render(
        StatusCode::OK,
        "login",
        LoginPage {
            username: String::new(),
            next: query.next,
        },
    )
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    flash: Flash,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.auth_service.login(&form.username, &form.password).await? {
        LoginOutcome::Refused(message) => Ok(flash.with(Level::Error, message).redirect(LOGIN_PATH)),
        LoginOutcome::InvalidCredentials => Ok(flash.with(Level::Error, INVALID_CREDENTIALS).render(
            StatusCode::BAD_REQUEST,
            "login",
            LoginPage {
                username: form.username,
                next: form.next,
            },
        )),
        LoginOutcome::Success { user, session } => {
            drop_previous_session(&state, &headers).await?;
            let target = safe_next(form.next.as_deref()).to_string();
            let response = flash
                .with(Level::Success, format!("Welcome, {}!", user.first_name))
                .redirect(&target);
            Ok(with_session_cookie(&state, response, &session))
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap, flash: Flash) -> Result<Response> {
    drop_previous_session(&state, &headers).await?;
    let mut response = flash
        .with(Level::Success, "You have been logged out.")
        .redirect(LOGIN_PATH);
    response
        .headers_mut()
        .append(header::SET_COOKIE, clear_cookie(SESSION_COOKIE));
    Ok(response)
}

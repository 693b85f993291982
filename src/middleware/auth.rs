use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use url::form_urlencoded;

use crate::models::user::User;
use crate::services::access_gate::{self, GateDecision, Visitor, LOGIN_PATH};
use crate::services::admin_service::AdminActor;
use crate::utils::cookies::{read_cookie, SESSION_COOKIE};
use crate::utils::flash::{Flash, Level};
use crate::AppState;

#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn login_redirect_target(req: &Request) -> String {
    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let encoded: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{}?next={}", LOGIN_PATH, encoded)
}

/// Admits only Normal accounts to the front-end pages behind it. The role is derived
/// from the stored account on every request.
pub async fn front_end_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let user = match read_cookie(req.headers(), SESSION_COOKIE) {
        Some(key) => match state.auth_service.session_user(&key).await {
            Ok(user) => user,
            Err(err) => return err.into_response(),
        },
        None => None,
    };

    let visitor = Visitor::from_role(user.as_ref().map(User::role));
    match (access_gate::front_end(visitor), user) {
        (GateDecision::Allow, Some(user)) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        (GateDecision::Redirect { location, message }, _) => {
            let target = if location == LOGIN_PATH {
                login_redirect_target(&req)
            } else {
                tracing::info!(path = %req.uri().path(), ?visitor, "privileged account sent to administration");
                location.to_string()
            };
            Flash::from_headers(req.headers())
                .with(Level::Info, message)
                .redirect(&target)
        }
        (GateDecision::Allow, None) => Flash::from_headers(req.headers()).redirect(LOGIN_PATH),
    }
}

pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    match state.auth_service.admin_user(token.trim()).await {
        Ok((user, role)) => {
            req.extensions_mut().insert(AdminActor { user, role });
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

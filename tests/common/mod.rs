#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use porsche_school::config::Config;
use porsche_school::models::question::{NewAnswer, NewQuestion, QuestionCategory};
use porsche_school::models::user::{NewUser, User};
use porsche_school::repositories::{MemoryStore, QuestionRepository, UserRepository};
use porsche_school::routes;
use porsche_school::services::sampler::{InOrderSampler, QuestionSampler};
use porsche_school::utils::crypto::PasswordService;
use porsche_school::utils::flash::{decode, Message};
use porsche_school::AppState;

pub const PASSWORD: &str = "Carrera911!";

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    passwords: PasswordService,
}

pub fn test_app() -> TestApp {
    test_app_with(Config::for_tests(), Arc::new(InOrderSampler))
}

pub fn test_app_with(config: Config, sampler: Arc<dyn QuestionSampler>) -> TestApp {
    let passwords = PasswordService::new(config.argon2_memory_kib, config.argon2_iterations)
        .expect("password service");
    let store = Arc::new(MemoryStore::new());
    let state = AppState::from_store(config, store.clone(), sampler).expect("app state");
    TestApp {
        app: routes::router(state),
        store,
        passwords,
    }
}

/// A seeded question: its id, the correct answer id and a wrong answer id.
pub struct SeededQuestion {
    pub id: i64,
    pub right: i64,
    pub wrong: i64,
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("response")
    }

    pub async fn seed_user(&self, username: &str, email: &str, is_staff: bool, is_superuser: bool) -> User {
        self.store
            .insert_user(NewUser {
                username: username.into(),
                email: email.into(),
                password_hash: self.passwords.hash_password(PASSWORD).expect("hash"),
                first_name: "Ferry".into(),
                last_name: "Porsche".into(),
                is_staff,
                is_superuser,
                is_active: true,
            })
            .await
            .expect("seed user")
    }

    pub async fn seed_question(&self, points: i32) -> SeededQuestion {
        let q = self
            .store
            .insert_question(NewQuestion {
                text: format!("Worth {} points", points),
                image: None,
                points,
                category: QuestionCategory::Traffic,
            })
            .await
            .expect("seed question");
        let right = self
            .store
            .insert_answer(NewAnswer { question_id: q.id, text: "Right".into(), is_correct: true })
            .await
            .expect("seed answer");
        let wrong = self
            .store
            .insert_answer(NewAnswer { question_id: q.id, text: "Wrong".into(), is_correct: false })
            .await
            .expect("seed answer");
        SeededQuestion { id: q.id, right: right.id, wrong: wrong.id }
    }

    /// Signs in through the front-end form and returns a `Cookie` header value.
    pub async fn login(&self, username: &str) -> String {
        let body = format!("username={}&password={}", username, encode(PASSWORD));
        let resp = self.send(form_post("/login/", None, &body)).await;
        let key = set_cookie_value(&resp, "sessionid").expect("session cookie");
        format!("sessionid={}", key)
    }

    /// Returns a bearer token from the administration login.
    pub async fn admin_token(&self, username: &str) -> String {
        let body = serde_json::json!({"username": username, "password": PASSWORD});
        let resp = self.send(json_request("POST", "/admin/login/", None, &body)).await;
        let json = body_json(resp).await;
        json["token"].as_str().expect("token").to_string()
    }
}

pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn form_post(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn bearer_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

pub async fn body_json(resp: Response<Body>) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}

/// Value of the named cookie in the response's `Set-Cookie` headers, ignoring deletions.
pub fn set_cookie_value(resp: &Response<Body>, name: &str) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| !v.contains("Max-Age=0"))
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub fn flash_messages(resp: &Response<Body>) -> Vec<Message> {
    set_cookie_value(resp, "messages")
        .map(|raw| decode(&raw))
        .unwrap_or_default()
}

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{bearer_get, body_json, get, json_request, test_app, PASSWORD};
use porsche_school::repositories::UserRepository;

#[tokio::test]
async fn admin_login_accepts_only_privileged_accounts() {
    let app = test_app();
    app.seed_user("driver", "driver@site.com", false, false).await;
    app.seed_user("coach", "coach@instructor.com", true, false).await;

    let resp = app
        .send(json_request("POST", "/admin/login/", None, &json!({"username": "driver", "password": PASSWORD})))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .send(json_request("POST", "/admin/login/", None, &json!({"username": "coach", "password": "nope"})))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .send(json_request("POST", "/admin/login/", None, &json!({"username": "coach", "password": PASSWORD})))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["role"], "instructor");
    assert_eq!(json["token_type"], "Bearer");
}

#[tokio::test]
async fn admin_api_needs_a_bearer_token() {
    let app = test_app();
    let resp = app.send(get("/admin/", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.send(bearer_get("/admin/", "garbage")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn instructor_sees_and_manages_teaching_material_only() {
    let app = test_app();
    app.seed_user("coach", "coach@instructor.com", true, false).await;
    let token = app.admin_token("coach").await;

    let index = body_json(app.send(bearer_get("/admin/", &token)).await).await;
    let modules: Vec<&str> = index["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["record"].as_str().unwrap())
        .collect();
    assert_eq!(modules, vec!["course", "question", "answer"]);

    let resp = app.send(bearer_get("/admin/meme/", &token)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = app.send(bearer_get("/admin/quizattempt/", &token)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = app
        .send(json_request("POST", "/admin/meme/", Some(&token), &json!({"title": "lol", "image": "memes/a.png"})))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let question = json!({
        "text": "What does a red octagon mean?",
        "points": 2,
        "category": "signs",
        "answers": [
            {"text": "Stop", "is_correct": true},
            {"text": "Yield"}
        ]
    });
    let resp = app
        .send(json_request("POST", "/admin/question/", Some(&token), &question))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["answers"].as_array().unwrap().len(), 2);
    let id = created["id"].as_i64().unwrap();

    let resp = app
        .send(json_request("PATCH", &format!("/admin/question/{}/", id), Some(&token), &json!({"points": 5})))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["points"], 5);

    let resp = app
        .send(json_request("POST", "/admin/question/", Some(&token), &json!({"text": "x", "points": 0})))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .send(json_request("POST", "/admin/question/", Some(&token), &json!({"text": "x", "points": 2147483647})))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = app
        .send(json_request("PATCH", &format!("/admin/question/{}/", id), Some(&token), &json!({"points": 101})))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quiz_attempts_are_read_only_even_for_superusers() {
    let app = test_app();
    app.seed_user("boss", "boss@site.com", true, true).await;
    let token = app.admin_token("boss").await;

    let resp = app.send(bearer_get("/admin/quizattempt/", &token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let attempt = json!({"user_id": 1, "score": 99, "total_questions": 1, "category": "general"});
    let resp = app
        .send(json_request("POST", "/admin/quizattempt/", Some(&token), &attempt))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = app
        .send(json_request("DELETE", "/admin/quizattempt/1/", Some(&token), &json!({})))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_record_types_are_not_found() {
    let app = test_app();
    app.seed_user("boss", "boss@site.com", true, true).await;
    let token = app.admin_token("boss").await;

    let resp = app.send(bearer_get("/admin/payments/", &token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provisioning_an_instructor_coerces_flags_and_generates_a_password() {
    let app = test_app();
    app.seed_user("boss", "boss@site.com", true, true).await;
    let token = app.admin_token("boss").await;

    let payload = json!({
        "username": "teach",
        "email": "teach@instructor.com",
        "is_superuser": true
    });
    let resp = app
        .send(json_request("POST", "/admin/user/", Some(&token), &payload))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["generated_password"], "teach123");
    assert_eq!(created["user"]["role"], "instructor");
    assert_eq!(created["user"]["is_staff"], true);
    assert_eq!(created["user"]["is_superuser"], false);
    assert!(created["user"].get("password_hash").is_none());

    let teach = app.store.find_user_by_username("teach").await.unwrap().unwrap();
    assert!(teach.is_staff && !teach.is_superuser);

    let resp = app
        .send(json_request("POST", "/admin/login/", None, &json!({"username": "teach", "password": "teach123"})))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn staff_reads_content_but_cannot_touch_accounts() {
    let app = test_app();
    app.seed_user("clerk", "clerk@site.com", true, false).await;
    let token = app.admin_token("clerk").await;

    assert_eq!(app.send(bearer_get("/admin/meme/", &token)).await.status(), StatusCode::OK);
    assert_eq!(app.send(bearer_get("/admin/user/", &token)).await.status(), StatusCode::FORBIDDEN);
    let resp = app
        .send(json_request("POST", "/admin/course/", Some(&token), &json!({"title": "t", "content": "c"})))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn demoted_operator_loses_access_with_the_same_token() {
    let app = test_app();
    let coach = app.seed_user("coach", "coach@instructor.com", true, false).await;
    let token = app.admin_token("coach").await;
    assert_eq!(app.send(bearer_get("/admin/course/", &token)).await.status(), StatusCode::OK);

    let mut demoted = coach.clone();
    demoted.is_staff = false;
    app.store.update_user(demoted).await.unwrap();

    assert_eq!(app.send(bearer_get("/admin/course/", &token)).await.status(), StatusCode::FORBIDDEN);
}

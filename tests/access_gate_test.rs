mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use common::{body_json, flash_messages, form_post, get, location, set_cookie_value, test_app, PASSWORD};
use porsche_school::models::session::Session;
use porsche_school::repositories::{SessionRepository, UserRepository};
use porsche_school::utils::flash::Level;

#[tokio::test]
async fn health_reports_storage_backend() {
    let app = test_app();
    let resp = app.send(get("/health", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "memory");
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login_with_next() {
    let app = test_app();
    for path in ["/", "/quiz/", "/profile/", "/memes/", "/course/1/"] {
        let resp = app.send(get(path, None)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", path);
        let expected = format!("/login/?next={}", common::encode(path));
        assert_eq!(location(&resp), expected);
    }
}

#[tokio::test]
async fn instructor_front_end_login_is_refused_without_a_session() {
    let app = test_app();
    app.seed_user("coach", "coach@instructor.com", true, false).await;

    let body = format!("username=coach&password={}", common::encode(PASSWORD));
    let resp = app.send(form_post("/login/", None, &body)).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login/");
    assert!(set_cookie_value(&resp, "sessionid").is_none());
    let messages = flash_messages(&resp);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Error);
    assert!(messages[0].text.contains("Instructor accounts"));
}

#[tokio::test]
async fn instructor_refused_even_with_a_wrong_password() {
    let app = test_app();
    app.seed_user("coach", "coach@instructor.com", true, false).await;

    let resp = app
        .send(form_post("/login/", None, "username=coach&password=nope"))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie_value(&resp, "sessionid").is_none());
    assert!(flash_messages(&resp)[0].text.contains("Instructor accounts"));
}

#[tokio::test]
async fn superuser_and_staff_are_refused_on_the_front_end() {
    let app = test_app();
    app.seed_user("boss", "boss@site.com", true, true).await;
    app.seed_user("clerk", "clerk@site.com", true, false).await;

    for username in ["boss", "clerk"] {
        let body = format!("username={}&password={}", username, common::encode(PASSWORD));
        let resp = app.send(form_post("/login/", None, &body)).await;
        assert_eq!(location(&resp), "/login/");
        assert!(set_cookie_value(&resp, "sessionid").is_none(), "{}", username);
    }
}

#[tokio::test]
async fn wrong_password_re_renders_the_login_page() {
    let app = test_app();
    app.seed_user("driver", "driver@site.com", false, false).await;

    let resp = app
        .send(form_post("/login/", None, "username=driver&password=wrong"))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie_value(&resp, "sessionid").is_none());
    let json = body_json(resp).await;
    assert_eq!(json["page"], "login");
    assert_eq!(json["username"], "driver");
    assert_eq!(json["messages"][0]["level"], "error");
}

#[tokio::test]
async fn normal_user_signs_in_by_username_or_email() {
    let app = test_app();
    app.seed_user("driver", "Driver@Site.com", false, false).await;

    let cookie = app.login("driver").await;
    let resp = app.send(get("/", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["page"], "home");
    assert_eq!(json["total_quizzes"], 0);

    let body = format!("username=driver%40site.com&password={}", common::encode(PASSWORD));
    let resp = app.send(form_post("/login/", None, &body)).await;
    assert_eq!(location(&resp), "/");
    assert!(set_cookie_value(&resp, "sessionid").is_some());
    assert_eq!(flash_messages(&resp)[0].text, "Welcome, Ferry!");
}

#[tokio::test]
async fn login_follows_only_local_next_targets() {
    let app = test_app();
    app.seed_user("driver", "driver@site.com", false, false).await;
    let password = common::encode(PASSWORD);

    let body = format!("username=driver&password={}&next=%2Fquiz%2F", password);
    let resp = app.send(form_post("/login/", None, &body)).await;
    assert_eq!(location(&resp), "/quiz/");

    let body = format!("username=driver&password={}&next=%2F%2Fevil.example", password);
    let resp = app.send(form_post("/accounts/login/", None, &body)).await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn privileged_session_is_redirected_to_administration() {
    let app = test_app();
    let staff = app.seed_user("clerk", "clerk@site.com", true, false).await;
    app.store
        .insert_session(Session {
            key: "k".repeat(40),
            user_id: staff.id,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(1),
        })
        .await
        .unwrap();

    let cookie = format!("sessionid={}", "k".repeat(40));
    for path in ["/", "/quiz/", "/quiz/history/", "/profile/"] {
        let resp = app.send(get(path, Some(&cookie))).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/admin/", "{}", path);
    }
}

#[tokio::test]
async fn role_is_re_derived_on_every_request() {
    let app = test_app();
    let user = app.seed_user("driver", "driver@site.com", false, false).await;
    let cookie = app.login("driver").await;
    assert_eq!(app.send(get("/profile/", Some(&cookie))).await.status(), StatusCode::OK);

    let mut promoted = user.clone();
    promoted.email = "driver@instructor.com".into();
    promoted.is_staff = true;
    app.store.update_user(promoted).await.unwrap();

    let resp = app.send(get("/profile/", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/");
}

#[tokio::test]
async fn expired_sessions_read_as_anonymous() {
    let app = test_app();
    let user = app.seed_user("driver", "driver@site.com", false, false).await;
    app.store
        .insert_session(Session {
            key: "e".repeat(40),
            user_id: user.id,
            created_at: Utc::now() - Duration::hours(3),
            expires_at: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();

    let cookie = format!("sessionid={}", "e".repeat(40));
    let resp = app.send(get("/", Some(&cookie))).await;
    assert!(location(&resp).starts_with("/login/"));
    assert!(app.store.find_session(&"e".repeat(40)).await.unwrap().is_none());
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = test_app();
    app.seed_user("driver", "driver@site.com", false, false).await;
    let cookie = app.login("driver").await;

    let resp = app.send(form_post("/logout/", Some(&cookie), "")).await;
    assert_eq!(location(&resp), "/login/");
    let cleared = resp
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("sessionid=;") && v.contains("Max-Age=0"));
    assert!(cleared);

    let resp = app.send(get("/", Some(&cookie))).await;
    assert!(location(&resp).starts_with("/login/"));
}

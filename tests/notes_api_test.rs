//! # 笔记 API 集成测试
//!
//! 覆盖认证网关、笔记创建/查询/列表以及健康检查

mod common;

use axum::http::{HeaderValue, StatusCode, header};
use chrono::Utc;
use common::{TestApp, bearer};
use notes_backend::auth::{AccountKind, SessionClaims, SessionPayload};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

async fn create_note(app: &TestApp, token: &str, title: &str, content: &str) -> Value {
    let response = bearer(app.server.post("/api/notes"), token)
        .json(&json!({ "title": title, "content": content }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn notes_require_bearer_header() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/api/notes").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["name"], "Unauthorized");
    assert_eq!(body["message"], "Missing or invalid Authorization header");

    let basic = app
        .server
        .get("/api/notes")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic YWRtaW46cGFzcw=="))
        .await;
    basic.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = TestApp::spawn().await;

    let response = bearer(app.server.get("/api/notes"), "not.a.jwt").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Invalid token");
}

#[tokio::test]
async fn token_from_another_key_is_rejected() {
    let app = TestApp::spawn().await;
    let other = TestApp::with_config({
        let mut config = common::test_config("HS256");
        config.jwt.secret = Some("a-different-secret".to_string());
        config
    })
    .await;

    let foreign = other.admin_token().await;
    let response = bearer(app.server.get("/api/notes"), &foreign).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Invalid token");
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        payload: SessionPayload {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            firstname: "Admin".to_string(),
            lastname: None,
            user_type: AccountKind::UserAccount,
            roles: vec!["ROLE_ADMIN".to_string()],
        },
        iat: now - 120,
        exp: now - 60,
        nbf: None,
    };
    let token = app.context.jwt.sign_claims(&claims).unwrap();

    let response = bearer(app.server.get("/api/notes"), &token).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Token has expired");
}

#[tokio::test]
async fn create_then_fetch_note() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = bearer(app.server.post("/api/notes"), &token)
        .json(&json!({ "title": "Groceries", "content": "Milk, eggs" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Note created successfully");
    let note = &body["data"];
    assert_eq!(note["title"], "Groceries");
    assert_eq!(note["content"], "Milk, eggs");
    assert!(note["createdAt"].is_string());

    let id = note["id"].as_str().unwrap();
    let fetched = bearer(app.server.get(&format!("/api/notes/{id}")), &token).await;
    fetched.assert_status_ok();
    let fetched = fetched.json::<Value>();
    assert_eq!(fetched["message"], "Note fetched successfully");
    assert_eq!(fetched["data"]["id"], id);
    assert_eq!(fetched["data"]["title"], "Groceries");
}

#[tokio::test]
async fn duplicate_title_conflicts() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    create_note(&app, &token, "Only once", "first").await;

    let response = bearer(app.server.post("/api/notes"), &token)
        .json(&json!({ "title": "Only once", "content": "second" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["name"], "Conflict");
    assert_eq!(body["message"], "Duplicate note title");
}

#[rstest]
#[case(json!({ "title": "", "content": "body" }), "title")]
#[case(json!({ "title": "t".repeat(151), "content": "body" }), "title")]
#[case(json!({ "title": "ok", "content": "" }), "content")]
#[case(json!({ "title": "ok", "content": "c".repeat(5001) }), "content")]
#[tokio::test]
async fn create_note_validates_fields(#[case] payload: Value, #[case] field: &str) {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = bearer(app.server.post("/api/notes"), &token).json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["details"][0]["field"], field);
}

#[tokio::test]
async fn get_note_checks_id_format_and_existence() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let bad = bearer(app.server.get("/api/notes/not-a-uuid"), &token).await;
    bad.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad.json::<Value>()["message"], "Invalid note ID format");

    let id = uuid::Uuid::new_v4();
    let missing = bearer(app.server.get(&format!("/api/notes/{id}")), &token).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body = missing.json::<Value>();
    assert_eq!(body["message"], "Note not found");
    assert_eq!(body["details"], format!("No note found with ID {id}"));
}

#[tokio::test]
async fn empty_list_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = bearer(app.server.get("/api/notes"), &token).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "No notes found");
}

#[tokio::test]
async fn list_notes_pages_and_sorts() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    for title in ["banana", "apple", "cherry"] {
        create_note(&app, &token, title, "fruit").await;
    }

    let response = bearer(app.server.get("/api/notes"), &token)
        .add_query_param("sortBy", "title")
        .add_query_param("sortOrder", "asc")
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Notes fetched successfully");
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["apple", "banana", "cherry"]);

    let page = bearer(app.server.get("/api/notes"), &token)
        .add_query_param("sortBy", "title")
        .add_query_param("sortOrder", "desc")
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .await;
    page.assert_status_ok();
    let data = page.json::<Value>()["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["title"], "apple");
}

#[rstest]
#[case("sortBy", "content")]
#[case("sortOrder", "up")]
#[case("limit", "500")]
#[case("page", "0")]
#[tokio::test]
async fn list_notes_rejects_bad_query(#[case] key: &str, #[case] value: &str) {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = bearer(app.server.get("/api/notes"), &token)
        .add_query_param(key, value)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["details"][0]["field"], key);
}

#[tokio::test]
async fn list_notes_rejects_page_past_offset_range() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    create_note(&app, &token, "only", "note").await;

    let response = bearer(app.server.get("/api/notes"), &token)
        .add_query_param("page", i64::MAX)
        .add_query_param("limit", 100)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["details"][0]["field"], "page");
    assert_eq!(body["details"][0]["message"], "Page is out of range");
}

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Service is healthy");
}

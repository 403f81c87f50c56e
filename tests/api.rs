//! End-to-end API tests
//!
//! Exercises the full router: middleware pipeline, generic resource
//! routes, and the login/register flows, against an in-memory database.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use inkstream::api::{build_router, AppState};
use inkstream::config::Config;
use inkstream::db::repositories::{
    SqlxArticleRepository, SqlxCategoryRepository, SqlxSessionRepository, SqlxTagRepository,
    SqlxUserRepository,
};
use inkstream::db::{create_test_pool, migrations};
use inkstream::services::{ArticleService, UserService};

async fn spawn_server() -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());

    let state = AppState {
        config: Arc::new(Config::default()),
        article_repo: article_repo.clone(),
        category_repo: category_repo.clone(),
        tag_repo: tag_repo.clone(),
        user_repo,
        session_repo,
        article_service: Arc::new(ArticleService::new(article_repo, tag_repo, category_repo)),
        user_service: Arc::new(UserService::new(SqlxUserRepository::boxed(pool))),
    };

    TestServer::new(build_router(state)).expect("Failed to start test server")
}

fn article_body(title: &str, tags: &[&str], category: &str) -> Value {
    json!({
        "title": title,
        "tags": tags,
        "excerpt": "excerpt",
        "content": "content",
        "category": category,
    })
}

#[tokio::test]
async fn test_article_crud_roundtrip() {
    let server = spawn_server().await;

    let created = server
        .post("/api/article/")
        .json(&article_body("test1", &["tag1", "tag2"], "test"))
        .await;
    created.assert_status_ok();
    let doc: Value = created.json();
    let id = doc["id"].as_i64().expect("id should be numeric");
    assert_eq!(doc["title"], "test1");

    let fetched = server.get(&format!("/api/article/{id}")).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["title"], "test1");

    let updated = server
        .put(&format!("/api/article/{id}"))
        .json(&json!({"title": "renamed"}))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["title"], "renamed");

    let deleted = server.delete(&format!("/api/article/{id}")).await;
    deleted.assert_status(axum::http::StatusCode::NO_CONTENT);

    let gone = server.get(&format!("/api/article/{id}")).await;
    gone.assert_status_not_found();
}

#[tokio::test]
async fn test_article_create_side_effects() {
    let server = spawn_server().await;

    server
        .post("/api/article/")
        .json(&article_body("a", &["tag1"], "test"))
        .await
        .assert_status_ok();
    server
        .post("/api/article/")
        .json(&article_body("b", &["tag1"], "test"))
        .await
        .assert_status_ok();

    // tag1 counted twice, single row
    let tags: Vec<Value> = server.get("/api/tag/").await.json();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["name"], "tag1");
    assert_eq!(tags[0]["number"], 2);

    // one category row per create, duplicates included
    let categories: Vec<Value> = server.get("/api/category/").await.json();
    assert_eq!(categories.len(), 2);
}

#[tokio::test]
async fn test_find_with_filters() {
    let server = spawn_server().await;

    server
        .post("/api/article/")
        .json(&article_body("a", &["rust"], "tech"))
        .await
        .assert_status_ok();
    server
        .post("/api/article/")
        .json(&article_body("b", &["life"], "life"))
        .await
        .assert_status_ok();

    let by_tag: Vec<Value> = server.get("/api/article/?tag=rust").await.json();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0]["title"], "a");

    let by_category: Vec<Value> = server.get("/api/article/?category=life").await.json();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0]["title"], "b");

    // unknown filter key matches nothing
    let unknown: Vec<Value> = server.get("/api/article/?author=nobody").await.json();
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn test_missing_document_is_explicit_404() {
    let server = spawn_server().await;

    let response = server.get("/api/article/999").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let deleted = server.delete("/api/tag/999").await;
    deleted.assert_status_not_found();
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let server = spawn_server().await;

    let response = server.get("/api/tag/").await;
    response.assert_status_ok();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["x-xss-protection"], "0");
    assert_eq!(headers["x-download-options"], "noopen");
    assert_eq!(headers["x-dns-prefetch-control"], "off");
}

#[tokio::test]
async fn test_session_cookie_issued_and_kept() {
    let server = spawn_server().await;

    let first = server.get("/api/tag/").await;
    let set_cookie = first
        .headers()
        .get("set-cookie")
        .expect("session cookie should be issued")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("inkstream.sid="));

    // Replaying the cookie keeps the same session id
    let sid = set_cookie
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches("inkstream.sid=")
        .to_string();
    let cookie_value =
        axum::http::HeaderValue::from_str(&format!("inkstream.sid={sid}")).unwrap();
    let second = server
        .get("/api/tag/")
        .add_header(axum::http::header::COOKIE, cookie_value)
        .await;
    let replayed = second.headers()["set-cookie"].to_str().unwrap();
    assert!(replayed.contains(&sid));
}

#[tokio::test]
async fn test_register_and_login_flow() {
    let server = spawn_server().await;

    let registered = server
        .post("/api/user/register")
        .json(&json!({"name": "alice", "email": "alice@example.com", "password": "secret"}))
        .await;
    registered.assert_status_ok();
    let body: Value = registered.json();
    assert_eq!(body["status"], "yes");
    assert_eq!(body["user"]["name"], "alice");

    // duplicate email; the rejection body carries no user key
    let dup_email = server
        .post("/api/user/register")
        .json(&json!({"name": "bob", "email": "alice@example.com", "password": "x"}))
        .await;
    let body: Value = dup_email.json();
    assert_eq!(body["status"], "no");
    assert_eq!(body["message"], "This email is already saved");
    assert!(!body.as_object().unwrap().contains_key("user"));

    // duplicate name
    let dup_name = server
        .post("/api/user/register")
        .json(&json!({"name": "alice", "email": "new@example.com", "password": "x"}))
        .await;
    let body: Value = dup_name.json();
    assert_eq!(body["status"], "no");
    assert_eq!(body["message"], "This name is already saved");

    // exactly one user row exists
    let users: Vec<Value> = server.get("/api/user/").await.json();
    assert_eq!(users.len(), 1);

    let login = server
        .post("/api/user/login?name=alice&password=secret")
        .await;
    login.assert_status_ok();
    let body: Value = login.json();
    assert_eq!(body["status"], "yes");
    assert_eq!(body["user"]["email"], "alice@example.com");

    // failed login still carries the user key, set to null
    let bad_login = server.post("/api/user/login?name=alice&password=wrong").await;
    let body: Value = bad_login.json();
    assert_eq!(body["status"], "no");
    assert!(body.as_object().unwrap().contains_key("user"));
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn test_invalid_body_is_400() {
    let server = spawn_server().await;

    let response = server
        .post("/api/article/")
        .json(&json!({"tags": ["missing-title"]}))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

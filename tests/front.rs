//! End-to-end front-server tests
//!
//! Exercises the catch-all page route and the ready/uninitialized state
//! machine against an on-disk template bundle and an in-memory database.

use axum_test::TestServer;
use std::sync::Arc;

use inkstream::config::Config;
use inkstream::db::repositories::{
    SqlxArticleRepository, SqlxCategoryRepository, SqlxTagRepository,
};
use inkstream::db::{create_test_pool, migrations};
use inkstream::models::CreateArticleInput;
use inkstream::services::ArticleService;
use inkstream::ssr::{build_front_router, FrontState};

struct Fixture {
    server: TestServer,
    service: ArticleService,
    state: FrontState,
    dir: tempfile::TempDir,
}

async fn spawn_front() -> Fixture {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("index.html"),
        concat!(
            "<!DOCTYPE html><html><head><title></title></head>",
            r#"<body><div id="app"></div></body></html>"#,
        ),
    )
    .unwrap();

    let bundle = dir.path().join("app");
    std::fs::create_dir(&bundle).unwrap();
    for (name, body) in [
        ("home.html", "<ul>{% for a in articles %}<li>{{ a.title }}</li>{% endfor %}</ul>"),
        ("article.html", "<h1>{{ article.title }}</h1>{{ article.content_html | safe }}"),
        ("tag.html", "<h1>#{{ tag.name }}</h1>"),
        ("category.html", "<h1>{{ category }}</h1>"),
    ] {
        std::fs::write(bundle.join(name), body).unwrap();
    }

    let mut config = Config::default();
    config.front.shell_path = dir.path().join("index.html");
    config.front.bundle_dir = bundle;
    config.front.dist_dir = dir.path().join("dist");
    config.front.public_dir = dir.path().join("public");

    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let articles = SqlxArticleRepository::boxed(pool.clone());
    let tags = SqlxTagRepository::boxed(pool.clone());
    let categories = SqlxCategoryRepository::boxed(pool);
    let service = ArticleService::new(articles.clone(), tags.clone(), categories.clone());

    let state = FrontState::new(Arc::new(config), articles, tags, categories);
    let server =
        TestServer::new(build_front_router(state.clone())).expect("Failed to start test server");

    Fixture {
        server,
        service,
        state,
        dir,
    }
}

fn input(title: &str, tags: &[&str], category: &str) -> CreateArticleInput {
    CreateArticleInput::new(
        title.to_string(),
        tags.iter().map(|t| t.to_string()).collect(),
        category.to_string(),
    )
    .with_excerpt("excerpt".to_string())
    .with_content("# heading".to_string())
}

#[tokio::test]
async fn test_uninitialized_serves_compiling_message() {
    let fixture = spawn_front().await;

    let response = fixture.server.get("/").await;
    response.assert_status_ok();
    response.assert_text("waiting for compilation... refresh in a moment.");
}

#[tokio::test]
async fn test_home_page_streams_shell_and_markup() {
    let fixture = spawn_front().await;
    fixture.state.rebuild().await.expect("Rebuild failed");
    fixture
        .service
        .create(&input("hello", &["rust"], "tech"))
        .await
        .unwrap();

    let response = fixture.server.get("/").await;
    response.assert_status_ok();

    let headers = response.headers();
    assert!(headers["content-type"].to_str().unwrap().contains("text/html"));
    assert!(headers["server"]
        .to_str()
        .unwrap()
        .starts_with("inkstream-front/"));

    let html = response.text();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>inkstream</title>"));
    assert!(html.contains("<li>hello</li>"));
    assert!(html.ends_with("</body></html>"));
}

#[tokio::test]
async fn test_article_page_injects_its_metadata() {
    let fixture = spawn_front().await;
    fixture.state.rebuild().await.expect("Rebuild failed");
    let article = fixture
        .service
        .create(&input("my post", &[], "tech"))
        .await
        .unwrap();

    let response = fixture.server.get(&format!("/article/{}", article.id)).await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("<title>my post</title>"));
    assert!(html.contains(r#"<meta name="description" content="excerpt">"#));
    assert!(html.contains("<h1>heading</h1>"));
}

#[tokio::test]
async fn test_missing_page_is_404_literal() {
    let fixture = spawn_front().await;
    fixture.state.rebuild().await.expect("Rebuild failed");

    let response = fixture.server.get("/article/999").await;
    response.assert_status_not_found();
    response.assert_text("404 | Page Not Found");

    let unknown = fixture.server.get("/definitely/not/a/route").await;
    unknown.assert_status_not_found();
    unknown.assert_text("404 | Page Not Found");
}

#[tokio::test]
async fn test_render_failure_is_500_literal() {
    let fixture = spawn_front().await;

    // An unknown filter parses fine but fails at render time
    std::fs::write(
        fixture.dir.path().join("app").join("home.html"),
        "{{ articles | no_such_filter }}",
    )
    .unwrap();
    fixture.state.rebuild().await.expect("Rebuild failed");

    let response = fixture.server.get("/").await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_text("500 | Internal Server Error");
}

#[tokio::test]
async fn test_tag_and_category_pages_render() {
    let fixture = spawn_front().await;
    fixture.state.rebuild().await.expect("Rebuild failed");
    fixture
        .service
        .create(&input("a", &["rust"], "tech"))
        .await
        .unwrap();

    let tag_page = fixture.server.get("/tag/rust").await;
    tag_page.assert_status_ok();
    assert!(tag_page.text().contains("#rust"));

    let category_page = fixture.server.get("/category/tech").await;
    category_page.assert_status_ok();
    assert!(category_page.text().contains("tech"));
}

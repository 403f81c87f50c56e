//! inkstream - blog API server

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkstream::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxCategoryRepository, SqlxSessionRepository,
            SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{ArticleService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkstream=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting inkstream API server...");

    // Load configuration
    let config = Arc::new(Config::load_with_env(Path::new("config.yml"))?);
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());

    // Initialize services
    let article_service = Arc::new(ArticleService::new(
        article_repo.clone(),
        tag_repo.clone(),
        category_repo.clone(),
    ));
    let user_service = Arc::new(UserService::new(user_repo.clone()));

    let state = AppState {
        config: config.clone(),
        article_repo,
        category_repo,
        tag_repo,
        user_repo,
        session_repo: session_repo.clone(),
        article_service,
        user_service,
    };

    // Reap expired sessions periodically
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            match session_repo.delete_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(reaped = n, "Expired sessions removed"),
                Err(e) => tracing::warn!("Session cleanup failed: {:#}", e),
            }
        }
    });

    // Build router
    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

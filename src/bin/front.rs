//! inkstream-front - SSR front server

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkstream::{
    config::Config,
    db::{
        self,
        repositories::{SqlxArticleRepository, SqlxCategoryRepository, SqlxTagRepository},
    },
    ssr::{build_front_router, FrontState},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkstream=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting inkstream front server...");

    let config = Arc::new(Config::load_with_env(Path::new("config.yml"))?);
    tracing::info!("Configuration loaded, mode: {:?}", config.front.mode);

    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database connected: {}", config.database.url);

    let state = FrontState::new(
        config.clone(),
        SqlxArticleRepository::boxed(pool.clone()),
        SqlxTagRepository::boxed(pool.clone()),
        SqlxCategoryRepository::boxed(pool),
    );
    state.init().await?;
    tracing::info!("Render context initialized");

    let app = build_front_router(state);

    let addr = format!("{}:{}", config.front.host, config.front.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Front server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

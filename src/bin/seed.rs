//! inkstream-seed - wipe and re-seed the database with fixture articles

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkstream::{
    config::Config,
    db::{
        self,
        repositories::{SqlxArticleRepository, SqlxCategoryRepository, SqlxTagRepository},
    },
    seed::run_seed,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkstream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;

    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database connected: {}", config.database.url);

    run_seed(
        SqlxArticleRepository::boxed(pool.clone()),
        SqlxTagRepository::boxed(pool.clone()),
        SqlxCategoryRepository::boxed(pool),
    )
    .await?;

    tracing::info!("Seed completed");

    Ok(())
}

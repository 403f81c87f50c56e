//! Database seeding
//!
//! Wipes articles, categories, and tags, then inserts the fixture
//! articles through the same tag/category save logic used by article
//! creation. Running the seed twice leaves exactly the second run's
//! fixtures.

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, CategoryRepository, TagRepository};
use crate::models::CreateArticleInput;
use crate::services::ArticleService;

fn fixtures() -> Vec<CreateArticleInput> {
    [
        ("test1", &["tag1", "tag2"]),
        ("test2", &["tag1", "tag3"]),
        ("test3", &["tag1", "tag4"]),
    ]
    .into_iter()
    .map(|(title, tags): (&str, &[&str; 2])| {
        CreateArticleInput::new(
            title.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
            "test".to_string(),
        )
        .with_excerpt("excerpt".to_string())
        .with_content("content".to_string())
    })
    .collect()
}

/// Wipe and re-seed the database
pub async fn run_seed(
    articles: Arc<dyn ArticleRepository>,
    tags: Arc<dyn TagRepository>,
    categories: Arc<dyn CategoryRepository>,
) -> Result<()> {
    let removed = categories.delete_all().await?;
    tracing::info!(removed, "Deleted all categories");

    let removed = articles.delete_all().await?;
    tracing::info!(removed, "Deleted all articles");

    let removed = tags.delete_all().await?;
    tracing::info!(removed, "Deleted all tags");

    let service = ArticleService::new(articles, tags, categories);
    for fixture in fixtures() {
        let article = service.create(&fixture).await?;
        tracing::info!(title = %article.title, "Saved fixture article");
    }

    Ok(())
}

//! Article service
//!
//! Article creation carries two side effects before the row is written:
//! every tag name is saved (created or counter-incremented), and a fresh
//! category row is appended for the article's category name. The category
//! insert is unconditional: creating two articles in the same category
//! leaves two category rows. Tag saves run concurrently; the atomic upsert
//! in the repository keeps them from racing each other.

use crate::db::repositories::{ArticleRepository, CategoryRepository, TagRepository};
use crate::models::{Article, Category, CreateArticleInput};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;

/// Errors from article operations
#[derive(Debug, Error)]
pub enum ArticleServiceError {
    /// Underlying storage failure
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Article business logic
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    tags: Arc<dyn TagRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        tags: Arc<dyn TagRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            articles,
            tags,
            categories,
        }
    }

    /// Create an article, saving its tags and category first.
    ///
    /// Order matches the write pipeline: tags, then category, then the
    /// article row. A failure in either side effect aborts the creation.
    pub async fn create(&self, input: &CreateArticleInput) -> Result<Article, ArticleServiceError> {
        self.save_tags(&input.tags).await?;
        self.save_category(&input.category).await?;

        let article = self.articles.create(input).await?;

        tracing::info!(id = article.id, title = %article.title, "Article created");

        Ok(article)
    }

    /// Save every tag name concurrently
    async fn save_tags(&self, names: &[String]) -> Result<(), ArticleServiceError> {
        let saves = names.iter().map(|name| self.tags.save(name));
        for result in join_all(saves).await {
            result?;
        }
        Ok(())
    }

    /// Append a category row for the name (no dedup)
    async fn save_category(&self, name: &str) -> Result<(), ArticleServiceError> {
        self.categories
            .create(&Category::new(name.to_string()))
            .await?;
        Ok(())
    }
}

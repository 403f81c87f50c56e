//! Article repository
//!
//! Database operations for articles. The `tags` column stores a JSON
//! array of strings; the `tag` filter key matches it through SQLite's
//! `json_each`, which keeps the document shape queryable without a join
//! table.

use crate::db::repositories::{filter_is_known, Filter};
use crate::models::{Article, CreateArticleInput, UpdateArticleInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

const FILTER_FIELDS: &[&str] = &["title", "category", "tag"];

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, input: &CreateArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// List articles matching a query-string filter
    async fn find(&self, filter: &Filter) -> Result<Vec<Article>>;

    /// List the most recent articles (for the front server's home page)
    async fn list_recent(&self, limit: i64) -> Result<Vec<Article>>;

    /// Update an article by ID, returning the post-update row when found
    async fn update_by_id(&self, id: i64, input: &UpdateArticleInput) -> Result<Option<Article>>;

    /// Delete an article by ID, returning whether a row was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Delete all articles (seeding)
    async fn delete_all(&self) -> Result<u64>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_COLUMNS: &str = "id, title, tags, excerpt, content, category, create_time";

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &CreateArticleInput) -> Result<Article> {
        let tags_json =
            serde_json::to_string(&input.tags).context("Failed to encode article tags")?;
        let create_time = input.create_time.unwrap_or_else(Utc::now);

        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, tags, excerpt, content, category, create_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&tags_json)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.category)
        .bind(create_time)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        Ok(Article {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            tags: input.tags.clone(),
            excerpt: input.excerpt.clone(),
            content: input.content.clone(),
            category: input.category.clone(),
            create_time,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by ID")?;

        row.map(|row| row_to_article(&row)).transpose()
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Article>> {
        if !filter_is_known(filter, FILTER_FIELDS) {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT {} FROM articles WHERE 1 = 1",
            SELECT_COLUMNS
        );
        let mut binds: Vec<&str> = Vec::new();

        if let Some(title) = filter.get("title") {
            sql.push_str(" AND title = ?");
            binds.push(title);
        }
        if let Some(category) = filter.get("category") {
            sql.push_str(" AND category = ?");
            binds.push(category);
        }
        if let Some(tag) = filter.get("tag") {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(articles.tags) WHERE json_each.value = ?)",
            );
            binds.push(tag);
        }
        sql.push_str(" ORDER BY create_time DESC, id DESC");

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to find articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles ORDER BY create_time DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list recent articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn update_by_id(&self, id: i64, input: &UpdateArticleInput) -> Result<Option<Article>> {
        if !input.has_changes() {
            return self.get_by_id(id).await;
        }

        let tags_json = input
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to encode article tags")?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE articles
            SET title = COALESCE(?, title),
                tags = COALESCE(?, tags),
                excerpt = COALESCE(?, excerpt),
                content = COALESCE(?, content),
                category = COALESCE(?, category)
            WHERE id = ?
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(&input.title)
        .bind(&tags_json)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.category)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update article")?;

        row.map(|row| row_to_article(&row)).transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await
            .context("Failed to delete all articles")?;

        Ok(result.rows_affected())
    }
}

fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let tags_json: String = row.get("tags");
    let tags: Vec<String> =
        serde_json::from_str(&tags_json).context("Failed to decode article tags")?;

    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        tags,
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        category: row.get("category"),
        create_time: row.get("create_time"),
    })
}

//! Tag repository
//!
//! Database operations for tags. The central operation is `save`: an
//! atomic find-or-create-then-increment keyed by tag name, used by article
//! creation and seeding. The UNIQUE constraint on `tags.name` plus the
//! single upsert statement replace the read-then-write counter update of
//! the original system, so concurrent saves of the same name cannot
//! produce duplicate rows or lost increments.

use crate::db::repositories::{filter_is_known, Filter};
use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Fields a query-string filter may match on
const FILTER_FIELDS: &[&str] = &["name"];

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// List tags matching a query-string filter
    async fn find(&self, filter: &Filter) -> Result<Vec<Tag>>;

    /// Atomically create the tag with `number = 1`, or increment the
    /// counter of the existing tag with that name. Returns the row after
    /// the write.
    async fn save(&self, name: &str) -> Result<Tag>;

    /// Update a tag by ID, returning the post-update row when found
    async fn update_by_id(
        &self,
        id: i64,
        name: Option<&str>,
        number: Option<i64>,
    ) -> Result<Option<Tag>>;

    /// Delete a tag by ID, returning whether a row was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Delete all tags (seeding)
    async fn delete_all(&self) -> Result<u64>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        let result = sqlx::query(
            r#"
            INSERT INTO tags (name, number)
            VALUES (?, ?)
            "#,
        )
        .bind(&tag.name)
        .bind(tag.number)
        .execute(&self.pool)
        .await
        .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: tag.name.clone(),
            number: tag.number,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, number
            FROM tags
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get tag by ID")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, number
            FROM tags
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get tag by name")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Tag>> {
        if !filter_is_known(filter, FILTER_FIELDS) {
            return Ok(Vec::new());
        }

        let rows = match filter.get("name") {
            Some(name) => {
                sqlx::query("SELECT id, name, number FROM tags WHERE name = ? ORDER BY id")
                    .bind(name)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT id, name, number FROM tags ORDER BY id")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to find tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn save(&self, name: &str) -> Result<Tag> {
        let row = sqlx::query(
            r#"
            INSERT INTO tags (name, number)
            VALUES (?, 1)
            ON CONFLICT(name) DO UPDATE SET number = number + 1
            RETURNING id, name, number
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save tag")?;

        Ok(row_to_tag(&row))
    }

    async fn update_by_id(
        &self,
        id: i64,
        name: Option<&str>,
        number: Option<i64>,
    ) -> Result<Option<Tag>> {
        let row = sqlx::query(
            r#"
            UPDATE tags
            SET name = COALESCE(?, name),
                number = COALESCE(?, number)
            WHERE id = ?
            RETURNING id, name, number
            "#,
        )
        .bind(name)
        .bind(number)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update tag")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tags")
            .execute(&self.pool)
            .await
            .context("Failed to delete all tags")?;

        Ok(result.rows_affected())
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        number: row.get("number"),
    }
}

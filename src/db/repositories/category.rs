//! Category repository
//!
//! Database operations for categories. Creation is append-only: no dedup
//! check is performed, a new row is inserted per call even when a category
//! with the same name already exists.

use crate::db::repositories::{filter_is_known, Filter};
use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

const FILTER_FIELDS: &[&str] = &["name"];

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category (no dedup by name)
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// List categories matching a query-string filter
    async fn find(&self, filter: &Filter) -> Result<Vec<Category>>;

    /// Update a category by ID, returning the post-update row when found
    async fn update_by_id(&self, id: i64, name: Option<&str>) -> Result<Option<Category>>;

    /// Delete a category by ID, returning whether a row was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Delete all categories (seeding)
    async fn delete_all(&self) -> Result<u64>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&category.name)
            .execute(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: category.name.clone(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by ID")?;

        Ok(row.map(|row| row_to_category(&row)))
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Category>> {
        if !filter_is_known(filter, FILTER_FIELDS) {
            return Ok(Vec::new());
        }

        let rows = match filter.get("name") {
            Some(name) => {
                sqlx::query("SELECT id, name FROM categories WHERE name = ? ORDER BY id")
                    .bind(name)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT id, name FROM categories ORDER BY id")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to find categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn update_by_id(&self, id: i64, name: Option<&str>) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            UPDATE categories
            SET name = COALESCE(?, name)
            WHERE id = ?
            RETURNING id, name
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update category")?;

        Ok(row.map(|row| row_to_category(&row)))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories")
            .execute(&self.pool)
            .await
            .context("Failed to delete all categories")?;

        Ok(result.rows_affected())
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
    }
}

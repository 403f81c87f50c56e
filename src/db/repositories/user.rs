//! User repository
//!
//! Database operations for users. Login goes through `find_one` with an
//! equality filter on the whitelisted fields; registration relies on
//! `get_by_email` and `get_by_name` for its application-layer uniqueness
//! checks.

use crate::db::repositories::{filter_is_known, Filter};
use crate::models::{CreateUserInput, UpdateUserInput, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

const FILTER_FIELDS: &[&str] = &["name", "email", "password"];

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by email address
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get user by display name
    async fn get_by_name(&self, name: &str) -> Result<Option<User>>;

    /// List users matching a query-string filter
    async fn find(&self, filter: &Filter) -> Result<Vec<User>>;

    /// First user matching the filter, if any
    async fn find_one(&self, filter: &Filter) -> Result<Option<User>>;

    /// Update a user by ID, returning the post-update row when found
    async fn update_by_id(&self, id: i64, input: &UpdateUserInput) -> Result<Option<User>>;

    /// Delete a user by ID, returning whether a row was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_COLUMNS: &str = "id, name, email, password, created_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password)
            VALUES (?, ?, ?)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(row_to_user(&row))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by ID")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ? LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE name = ? LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by name")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<User>> {
        if !filter_is_known(filter, FILTER_FIELDS) {
            return Ok(Vec::new());
        }

        let mut sql = format!("SELECT {} FROM users WHERE 1 = 1", SELECT_COLUMNS);
        let mut binds: Vec<&str> = Vec::new();

        for field in FILTER_FIELDS {
            if let Some(value) = filter.get(*field) {
                sql.push_str(&format!(" AND {} = ?", field));
                binds.push(value);
            }
        }
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to find users")?;

        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<User>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn update_by_id(&self, id: i64, input: &UpdateUserInput) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password = COALESCE(?, password)
            WHERE id = ?
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update user")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password: row.get("password"),
        created_at: row.get("created_at"),
    }
}

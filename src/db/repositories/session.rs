//! Session repository
//!
//! Server-side session storage keyed by the cookie value. Expired rows are
//! treated as absent on read and reaped opportunistically by
//! `delete_expired`.

use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session with empty data
    async fn create(&self, id: &str, expires_at: DateTime<Utc>) -> Result<Session>;

    /// Get a live session by ID; expired sessions read as `None`
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Replace the session's data payload
    async fn set_data(&self, id: &str, data: &serde_json::Value) -> Result<bool>;

    /// Delete a session by ID, returning whether a row was removed
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Remove all expired sessions, returning the number reaped
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: SqlitePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, id: &str, expires_at: DateTime<Utc>) -> Result<Session> {
        let row = sqlx::query(
            r#"
            INSERT INTO sessions (id, data, expires_at)
            VALUES (?, '{}', ?)
            RETURNING id, data, expires_at, created_at
            "#,
        )
        .bind(id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create session")?;

        row_to_session(&row)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT id, data, expires_at, created_at
            FROM sessions
            WHERE id = ? AND expires_at > ?
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session")?;

        row.map(|row| row_to_session(&row)).transpose()
    }

    async fn set_data(&self, id: &str, data: &serde_json::Value) -> Result<bool> {
        let encoded = serde_json::to_string(data).context("Failed to encode session data")?;

        let result = sqlx::query("UPDATE sessions SET data = ? WHERE id = ?")
            .bind(&encoded)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update session data")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected())
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    let data_json: String = row.get("data");
    let data = serde_json::from_str(&data_json).context("Failed to decode session data")?;

    Ok(Session {
        id: row.get("id"),
        data,
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;
    use serde_json::json;

    async fn setup_test_repo() -> SqlxSessionRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxSessionRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let repo = setup_test_repo().await;
        let expires = Utc::now() + Duration::hours(1);

        let created = repo
            .create("sid-1", expires)
            .await
            .expect("Failed to create session");
        assert_eq!(created.id, "sid-1");
        assert_eq!(created.data, json!({}));

        let found = repo
            .get_by_id("sid-1")
            .await
            .expect("Failed to get session")
            .expect("Session should exist");
        assert_eq!(found.id, "sid-1");
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_expired_session_reads_as_none() {
        let repo = setup_test_repo().await;
        let expired = Utc::now() - Duration::hours(1);

        repo.create("sid-old", expired)
            .await
            .expect("Failed to create session");

        let found = repo.get_by_id("sid-old").await.expect("Failed to get session");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_set_data() {
        let repo = setup_test_repo().await;
        repo.create("sid-1", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let updated = repo
            .set_data("sid-1", &json!({"user_id": 42}))
            .await
            .expect("Failed to set data");
        assert!(updated);

        let session = repo
            .get_by_id("sid-1")
            .await
            .expect("Failed to get session")
            .expect("Session should exist");
        assert_eq!(session.data["user_id"], 42);
    }

    #[tokio::test]
    async fn test_delete_expired_reaps_only_stale_rows() {
        let repo = setup_test_repo().await;
        repo.create("live", Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        repo.create("stale", Utc::now() - Duration::hours(1))
            .await
            .unwrap();

        let reaped = repo.delete_expired().await.expect("Failed to reap");
        assert_eq!(reaped, 1);

        assert!(repo.get_by_id("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let repo = setup_test_repo().await;
        repo.create("sid-1", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert!(repo.delete_by_id("sid-1").await.expect("Failed to delete"));
        assert!(!repo.delete_by_id("sid-1").await.expect("Failed to delete"));
    }
}

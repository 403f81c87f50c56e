//! Database migrations module
//!
//! Code-based migrations embedded in the binary for single-binary
//! deployment. Each migration is a `Migration` struct with a unique
//! version; applied versions are tracked in `schema_migrations`.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i64,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements
    pub up: &'static str,
}

/// All migrations for the inkstream blog system.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: Create users table.
    // No UNIQUE constraints on name/email: uniqueness is enforced at the
    // application layer during registration only.
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);
        "#,
    },
    // Migration 2: Create sessions table
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                data TEXT NOT NULL DEFAULT '{}',
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    // Migration 3: Create categories table.
    // Names are deliberately not unique: article creation appends a new
    // row per call regardless of existing names.
    Migration {
        version: 3,
        name: "create_categories",
        up: r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);
        "#,
    },
    // Migration 4: Create tags table.
    // The UNIQUE name constraint backs the atomic upsert that replaces the
    // original read-then-write counter update.
    Migration {
        version: 4,
        name: "create_tags",
        up: r#"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE,
                number INTEGER NOT NULL DEFAULT 1
            );
        "#,
    },
    // Migration 5: Create articles table.
    // `tags` is a JSON array of strings; `category` a denormalized name.
    Migration {
        version: 5,
        name: "create_articles",
        up: r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                excerpt TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                category VARCHAR(100) NOT NULL,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_articles_category ON articles(category);
            CREATE INDEX IF NOT EXISTS idx_articles_create_time ON articles(create_time);
        "#,
    },
];

/// Run all pending migrations.
///
/// Creates the `schema_migrations` ledger table on first run and applies
/// every migration with a version greater than the last applied one.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    let current = current_version(pool).await?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }

        tracing::info!(
            "Applying migration {} ({})",
            migration.version,
            migration.name
        );

        // Each migration may contain multiple statements
        for statement in migration.up.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!(
                    "Failed to apply migration {} ({})",
                    migration.version, migration.name
                )
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .context("Failed to record migration")?;
    }

    Ok(())
}

/// Get the highest applied migration version (0 if none)
async fn current_version(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COALESCE(MAX(version), 0) AS version FROM schema_migrations")
        .fetch_one(pool)
        .await
        .context("Failed to read schema_migrations")?;
    Ok(row.get("version"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_migrations_create_all_tables() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations failed");

        for table in ["users", "sessions", "categories", "tags", "articles"] {
            let row =
                sqlx::query("SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(table)
                    .fetch_one(&pool)
                    .await
                    .expect("Failed to query sqlite_master");
            let count: i64 = row.get("count");
            assert_eq!(count, 1, "table {} should exist", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("First run failed");
        run_migrations(&pool).await.expect("Second run failed");

        let version = current_version(&pool).await.expect("Failed to read version");
        assert_eq!(version, MIGRATIONS.last().unwrap().version);
    }

    #[tokio::test]
    async fn test_tag_name_is_unique() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations failed");

        sqlx::query("INSERT INTO tags (name) VALUES ('dup')")
            .execute(&pool)
            .await
            .expect("First insert should succeed");
        let result = sqlx::query("INSERT INTO tags (name) VALUES ('dup')")
            .execute(&pool)
            .await;
        assert!(result.is_err(), "duplicate tag name should be rejected");
    }

    #[tokio::test]
    async fn test_category_name_is_not_unique() {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations failed");

        for _ in 0..2 {
            sqlx::query("INSERT INTO categories (name) VALUES ('dup')")
                .execute(&pool)
                .await
                .expect("Duplicate category names are allowed");
        }
    }
}

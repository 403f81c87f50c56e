//! Database layer
//!
//! SQLite-backed persistence for the inkstream blog system. The entities
//! are document-shaped (JSON-encoded tag arrays, denormalized name
//! strings) on top of a single embedded store.
//!
//! # Usage
//!
//! ```ignore
//! use inkstream::config::DatabaseConfig;
//! use inkstream::db::{create_pool, migrations};
//!
//! let config = DatabaseConfig::default();
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};

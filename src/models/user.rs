//! User model
//!
//! Uniqueness of `email` and `name` is enforced at the application layer
//! during registration, not by the schema. The generic create path can
//! still produce duplicates; see DESIGN.md.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Stored credential, compared verbatim at login
    pub password: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user (register or generic create)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Credential
    pub password: String,
}

/// Input for updating an existing user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserInput {
    /// New display name (optional)
    pub name: Option<String>,
    /// New email address (optional)
    pub email: Option<String>,
    /// New credential (optional)
    pub password: Option<String>,
}

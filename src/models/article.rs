//! Article model
//!
//! This module provides:
//! - `Article` entity representing a blog article
//! - Input types for creating and updating articles
//!
//! Articles are free-standing documents: `tags` and `category` are
//! denormalized strings, not references to Tag/Category rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Tag names referenced by this article
    pub tags: Vec<String>,
    /// Short excerpt shown in listings
    pub excerpt: String,
    /// Markdown content
    pub content: String,
    /// Category name (denormalized)
    pub category: String,
    /// Creation timestamp
    pub create_time: DateTime<Utc>,
}

/// Input for creating a new article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleInput {
    /// Article title
    pub title: String,
    /// Tag names
    #[serde(default)]
    pub tags: Vec<String>,
    /// Short excerpt
    #[serde(default)]
    pub excerpt: String,
    /// Markdown content
    #[serde(default)]
    pub content: String,
    /// Category name
    pub category: String,
    /// Creation timestamp (defaults to now)
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

impl CreateArticleInput {
    /// Create a new CreateArticleInput
    pub fn new(title: String, tags: Vec<String>, category: String) -> Self {
        Self {
            title,
            tags,
            excerpt: String::new(),
            content: String::new(),
            category,
            create_time: None,
        }
    }

    /// Set the excerpt
    pub fn with_excerpt(mut self, excerpt: String) -> Self {
        self.excerpt = excerpt;
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}

/// Input for updating an existing article.
///
/// Unset fields are left untouched (partial update).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New tag names (optional)
    pub tags: Option<Vec<String>>,
    /// New excerpt (optional)
    pub excerpt: Option<String>,
    /// New content (optional)
    pub content: Option<String>,
    /// New category name (optional)
    pub category: Option<String>,
}

impl UpdateArticleInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.tags.is_some()
            || self.excerpt.is_some()
            || self.content.is_some()
            || self.category.is_some()
    }
}

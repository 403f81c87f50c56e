//! Category model
//!
//! Categories are append-only name records. Article creation inserts a new
//! category row per call without checking for an existing row with the
//! same name; duplicate names are expected data.

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name (not unique)
    pub name: String,
}

impl Category {
    /// Create a new Category with the given name.
    pub fn new(name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
        }
    }
}

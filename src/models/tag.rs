//! Tag model
//!
//! A tag is a usage counter keyed by name: `number` is incremented each
//! time an article references the tag, and a new row is created only when
//! no tag with that name exists yet. At most one tag document exists per
//! distinct name.

use serde::{Deserialize, Serialize};

/// Tag entity with a usage counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name
    pub name: String,
    /// Number of articles that have referenced this tag, starts at 1
    pub number: i64,
}

impl Tag {
    /// Create a new Tag with the given name and a counter of 1.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            number: 1,
        }
    }
}

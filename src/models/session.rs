//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side session keyed by the cookie value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (cookie value)
    pub id: String,
    /// Arbitrary session data (JSON object)
    pub data: serde_json::Value,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

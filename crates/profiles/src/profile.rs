use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devmart_core::UserId;

/// A storefront user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Fresh profile carrying only what the session provider reports.
    pub fn new(id: UserId, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
            avatar_url: None,
            phone: None,
            country: None,
            created_at: now,
            updated_at: now,
        }
    }
}

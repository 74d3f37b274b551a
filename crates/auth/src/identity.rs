use serde::{Deserialize, Serialize};

use devmart_core::UserId;

/// Role granted to an identity.
///
/// The storefront only distinguishes buyers from panel admins; richer RBAC
/// belongs to the external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

/// Identity of an authenticated user as the external session provider
/// reports it: an opaque id and an email.
///
/// The core never manages credentials; it only reads this. Operations that
/// require authentication take `Option<&Identity>` explicitly rather than
/// consulting ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

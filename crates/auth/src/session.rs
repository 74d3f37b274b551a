use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use devmart_core::UserId;

use crate::identity::{Identity, Role};

/// Opaque session token issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown or expired session token")]
    UnknownToken,

    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Session boundary: current-identity resolution and sign-out.
///
/// Implementations validate an opaque token and return the identity it was
/// issued for. Token issuance/verification internals (JWT, cookies, ...)
/// stay on the provider's side of the boundary, as does sign-in, whose
/// shape varies by provider.
pub trait SessionProvider: Send + Sync {
    fn resolve(&self, token: &SessionToken) -> Result<Identity, SessionError>;

    fn sign_out(&self, token: &SessionToken) -> Result<(), SessionError>;
}

/// In-memory session provider for dev/tests.
///
/// Sign-in issues a random opaque token; sign-out revokes it. Not intended
/// for production use.
#[derive(Debug, Default)]
pub struct InMemorySessionProvider {
    sessions: RwLock<HashMap<SessionToken, Identity>>,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a session for the given email, creating a fresh user id.
    pub fn sign_in(&self, email: impl Into<String>, role: Role) -> Result<SessionToken, SessionError> {
        self.sign_in_as(UserId::new(), email, role)
    }

    /// Issue a session for an existing user id (tests pin ids this way).
    pub fn sign_in_as(
        &self,
        user_id: UserId,
        email: impl Into<String>,
        role: Role,
    ) -> Result<SessionToken, SessionError> {
        let token = SessionToken::new(Uuid::now_v7().simple().to_string());
        let identity = Identity::new(user_id, email, role);

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable("lock poisoned".to_string()))?;
        sessions.insert(token.clone(), identity);
        Ok(token)
    }

}

impl SessionProvider for InMemorySessionProvider {
    fn resolve(&self, token: &SessionToken) -> Result<Identity, SessionError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::Unavailable("lock poisoned".to_string()))?;
        sessions.get(token).cloned().ok_or(SessionError::UnknownToken)
    }

    fn sign_out(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Unavailable("lock poisoned".to_string()))?;
        sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_then_resolve_returns_identity() {
        let provider = InMemorySessionProvider::new();
        let token = provider.sign_in("buyer@devmart.dev", Role::Customer).unwrap();

        let identity = provider.resolve(&token).unwrap();
        assert_eq!(identity.email, "buyer@devmart.dev");
        assert_eq!(identity.role, Role::Customer);
    }

    #[test]
    fn sign_out_revokes_token() {
        let provider = InMemorySessionProvider::new();
        let token = provider.sign_in("buyer@devmart.dev", Role::Customer).unwrap();
        provider.sign_out(&token).unwrap();

        assert_eq!(provider.resolve(&token), Err(SessionError::UnknownToken));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let provider = InMemorySessionProvider::new();
        let err = provider
            .resolve(&SessionToken::new("bogus"))
            .unwrap_err();
        assert_eq!(err, SessionError::UnknownToken);
    }
}

use devmart_auth::Identity;

/// Authenticated caller context for a request.
///
/// Populated by the auth middleware; handlers pass the identity onward as
/// an explicit argument instead of reading ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    identity: Identity,
}

impl AuthContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

//! `devmart-auth` — the session/identity boundary.
//!
//! The storefront consults an external identity provider; this crate models
//! that boundary (identity + opaque session tokens) without reproducing the
//! provider's credential handling. It is intentionally decoupled from HTTP
//! and storage.

pub mod identity;
pub mod session;

pub use identity::{Identity, Role};
pub use session::{InMemorySessionProvider, SessionError, SessionProvider, SessionToken};

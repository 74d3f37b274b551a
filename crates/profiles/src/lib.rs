//! `devmart-profiles` — user profile records.
//!
//! Profiles mirror what the session provider knows (id, email) plus the
//! contact fields the purchase flow collects. The purchase workflow syncs
//! buyer details into the profile as a best-effort side channel.

pub mod profile;
pub mod repository;

pub use profile::UserProfile;
pub use repository::ProfileRepository;

//! `devmart-collections` — wishlist and cart membership.
//!
//! Membership is existence-only: a (user, project) pair is either in a
//! collection or not. No quantities, no ordering semantics. Toggles are
//! read-before-write with last-write-wins, matching the storefront.

pub mod membership;

pub use membership::{CollectionKind, Membership, MembershipRepository};

//! `devmart-licensing` — license key generation and validation.
//!
//! A license key is the commercial-use credential issued once per completed
//! purchase. Keys are uniformly random but carry no cryptographic weight;
//! possession of the key is the whole scheme.

pub mod key;

pub use key::{LicenseKey, LicenseKeyError};

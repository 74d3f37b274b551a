//! `devmart-observability` — process-wide logging/tracing setup.

pub mod tracing;

pub use tracing::{init, init_with_filter};

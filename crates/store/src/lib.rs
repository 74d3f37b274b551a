//! `devmart-store` — external persistence boundaries.
//!
//! The storefront persists all business state through a hosted
//! backend-as-a-service. This crate models the two surfaces of that service
//! the core depends on (a table-oriented record store and a path-addressed
//! file store) as traits, plus in-memory implementations for dev/tests. The
//! hosted service itself is never reproduced here.

pub mod file_storage;
pub mod record_store;

pub use file_storage::{FileStorage, FileStorageError, InMemoryFileStorage};
pub use record_store::{
    Direction, Filter, InMemoryRecordStore, OrderBy, RecordStore, RpcHandler, StoreError, Tables,
};

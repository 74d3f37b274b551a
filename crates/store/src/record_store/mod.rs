//! Table-oriented record store boundary.
//!
//! This module defines the abstraction for the hosted service's relational
//! surface (table-scoped create/read/update/delete with filter predicates
//! and a named remote-procedure hook) without making storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryRecordStore, RpcHandler, Tables};
pub use r#trait::{Direction, Filter, OrderBy, RecordStore, StoreError};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

/// Record store operation error.
///
/// The core treats any non-success response from the hosted service
/// uniformly as a failure signal with an attached message; the variants
/// only separate transport faults from request problems so the HTTP layer
/// can pick a sensible status code.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network/service failure while talking to the store.
    #[error("store transport failure: {0}")]
    Transport(String),

    /// The store rejected the request (bad table, malformed row, ...).
    #[error("store rejected request: {0}")]
    Validation(String),

    /// A returned row could not be decoded into the expected record shape.
    #[error("row decode failed: {0}")]
    Decode(String),

    /// The named remote procedure is not available on this store.
    ///
    /// Callers with a client-side fallback (e.g. counter increments) switch
    /// to it on this variant.
    #[error("unsupported rpc: {0}")]
    UnsupportedRpc(String),
}

impl StoreError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Conjunction of column equality predicates.
///
/// This mirrors the filter surface the storefront actually uses against the
/// hosted query builder (`.eq(column, value)` chains); no other comparison
/// operators are needed by the core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<(String, JsonValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate (builder-style).
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.predicates.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[(String, JsonValue)] {
        &self.predicates
    }

    /// True when every predicate matches the row's corresponding field.
    pub fn matches(&self, row: &JsonValue) -> bool {
        self.predicates
            .iter()
            .all(|(column, expected)| row.get(column) == Some(expected))
    }
}

/// Sort direction for `OrderBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-column ordering for `select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Descending,
        }
    }
}

/// Generic table-oriented record store.
///
/// Rows are JSON objects; tables are named, not typed. Typed repositories in
/// the domain crates do the (de)serialization at their edge, so this trait
/// stays agnostic of every record shape the storefront persists.
///
/// All calls are asynchronous and may fail with a transport or validation
/// error. Implementations are expected to:
/// - assign an `id` to inserted rows that lack one,
/// - return inserted rows as stored (with defaults applied),
/// - apply `update` patches as shallow field merges,
/// - expose atomic counter increments behind `rpc` where the backend
///   supports them, returning `StoreError::UnsupportedRpc` otherwise.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert rows into a table, returning them as stored.
    async fn insert(&self, table: &str, rows: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError>;

    /// Select rows matching `filter`, optionally ordered.
    async fn select(
        &self,
        table: &str,
        filter: Filter,
        order: Option<OrderBy>,
    ) -> Result<Vec<JsonValue>, StoreError>;

    /// Shallow-merge `patch` into every row matching `filter`; returns the
    /// number of rows affected.
    async fn update(&self, table: &str, patch: JsonValue, filter: Filter)
        -> Result<u64, StoreError>;

    /// Delete rows matching `filter`; returns the number of rows removed.
    async fn delete(&self, table: &str, filter: Filter) -> Result<u64, StoreError>;

    /// Invoke a named remote procedure (the store's atomic-increment hook).
    async fn rpc(&self, name: &str, args: JsonValue) -> Result<JsonValue, StoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn insert(&self, table: &str, rows: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError> {
        (**self).insert(table, rows).await
    }

    async fn select(
        &self,
        table: &str,
        filter: Filter,
        order: Option<OrderBy>,
    ) -> Result<Vec<JsonValue>, StoreError> {
        (**self).select(table, filter, order).await
    }

    async fn update(
        &self,
        table: &str,
        patch: JsonValue,
        filter: Filter,
    ) -> Result<u64, StoreError> {
        (**self).update(table, patch, filter).await
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<u64, StoreError> {
        (**self).delete(table, filter).await
    }

    async fn rpc(&self, name: &str, args: JsonValue) -> Result<JsonValue, StoreError> {
        (**self).rpc(name, args).await
    }
}

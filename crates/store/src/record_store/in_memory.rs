use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::r#trait::{Direction, Filter, OrderBy, RecordStore, StoreError};

/// Table name → stored rows.
pub type Tables = HashMap<String, Vec<JsonValue>>;

/// Handler for a named remote procedure, operating on the table map.
pub type RpcHandler =
    Box<dyn Fn(&mut Tables, JsonValue) -> Result<JsonValue, StoreError> + Send + Sync>;

/// In-memory record store.
///
/// Intended for tests/dev. Not optimized for performance. Remote procedures
/// are not built in; register them per deployment with `register_rpc` the
/// same way the hosted service defines named server functions.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
    rpcs: RwLock<HashMap<String, RpcHandler>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named remote procedure.
    pub fn register_rpc(&self, name: impl Into<String>, handler: RpcHandler) {
        if let Ok(mut rpcs) = self.rpcs.write() {
            rpcs.insert(name.into(), handler);
        }
    }

    fn poisoned() -> StoreError {
        StoreError::transport("lock poisoned")
    }

    fn compare(a: &JsonValue, b: &JsonValue) -> core::cmp::Ordering {
        use core::cmp::Ordering;
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, table: &str, rows: Vec<JsonValue>) -> Result<Vec<JsonValue>, StoreError> {
        let mut stored_rows = Vec::with_capacity(rows.len());
        let now = Utc::now().to_rfc3339();

        for (idx, mut row) in rows.into_iter().enumerate() {
            let obj = row.as_object_mut().ok_or_else(|| {
                StoreError::validation(format!("row at index {idx} is not an object"))
            })?;

            // Backend defaults: id and timestamps are filled in when absent.
            obj.entry("id")
                .or_insert_with(|| JsonValue::String(Uuid::now_v7().to_string()));
            obj.entry("created_at")
                .or_insert_with(|| JsonValue::String(now.clone()));
            obj.entry("updated_at")
                .or_insert_with(|| JsonValue::String(now.clone()));

            stored_rows.push(row);
        }

        let mut tables = self.tables.write().map_err(|_| Self::poisoned())?;
        let table_rows = tables.entry(table.to_string()).or_default();
        table_rows.extend(stored_rows.iter().cloned());

        Ok(stored_rows)
    }

    async fn select(
        &self,
        table: &str,
        filter: Filter,
        order: Option<OrderBy>,
    ) -> Result<Vec<JsonValue>, StoreError> {
        let tables = self.tables.read().map_err(|_| Self::poisoned())?;
        let mut rows: Vec<JsonValue> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let left = a.get(&order.column).unwrap_or(&JsonValue::Null);
                let right = b.get(&order.column).unwrap_or(&JsonValue::Null);
                let ord = Self::compare(left, right);
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        Ok(rows)
    }

    async fn update(
        &self,
        table: &str,
        patch: JsonValue,
        filter: Filter,
    ) -> Result<u64, StoreError> {
        let patch = patch
            .as_object()
            .ok_or_else(|| StoreError::validation("update patch is not an object"))?
            .clone();

        let mut tables = self.tables.write().map_err(|_| Self::poisoned())?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| filter.matches(r)) {
            if let Some(obj) = row.as_object_mut() {
                for (key, value) in &patch {
                    obj.insert(key.clone(), value.clone());
                }
                affected += 1;
            }
        }

        Ok(affected)
    }

    async fn delete(&self, table: &str, filter: Filter) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().map_err(|_| Self::poisoned())?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok((before - rows.len()) as u64)
    }

    async fn rpc(&self, name: &str, args: JsonValue) -> Result<JsonValue, StoreError> {
        let rpcs = self.rpcs.read().map_err(|_| Self::poisoned())?;
        let handler = rpcs
            .get(name)
            .ok_or_else(|| StoreError::UnsupportedRpc(name.to_string()))?;

        let mut tables = self.tables.write().map_err(|_| Self::poisoned())?;
        handler(&mut tables, args)
    }
}

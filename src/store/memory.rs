//! In-memory store used by tests and local development. Mirrors the
//! PostgreSQL backend's observable behavior: generated ids, timestamps,
//! id ordering, exact-match filters.

use super::{clamp_page, Store, StoreError};
use crate::entity::TableSchema;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

#[derive(Default)]
struct TableData {
    next_id: i64,
    rows: BTreeMap<i64, Value>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, TableData>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

fn now_string() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

fn matches(row: &Value, filters: &[(String, Value)]) -> bool {
    let Some(map) = row.as_object() else {
        return false;
    };
    filters
        .iter()
        .all(|(col, val)| map.get(col.as_str()) == Some(val))
}

#[async_trait]
impl Store for MemoryStore {
    async fn list(
        &self,
        table: &TableSchema,
        filters: &[(String, Value)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, StoreError> {
        let (limit, offset) = clamp_page(limit, offset);
        let tables = self.tables.read().unwrap();
        let rows = match tables.get(table.table) {
            Some(data) => data
                .rows
                .values()
                .filter(|row| matches(row, filters))
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(rows)
    }

    async fn find(&self, table: &TableSchema, id: i64) -> Result<Option<Value>, StoreError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .get(table.table)
            .and_then(|data| data.rows.get(&id))
            .cloned())
    }

    async fn find_where_in(
        &self,
        table: &TableSchema,
        column: &str,
        values: &[Value],
    ) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().unwrap();
        let rows = match tables.get(table.table) {
            Some(data) => data
                .rows
                .values()
                .filter(|row| {
                    row.as_object()
                        .and_then(|m| m.get(column))
                        .map(|v| values.contains(v))
                        .unwrap_or(false)
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(rows)
    }

    async fn insert(
        &self,
        table: &TableSchema,
        row: &Map<String, Value>,
    ) -> Result<Value, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let data = tables.entry(table.table.to_string()).or_default();
        data.next_id += 1;
        let id = data.next_id;

        let mut stored = Map::new();
        for col in &table.columns {
            let value = match col.name {
                "id" => Value::from(id),
                "created_at" | "updated_at" => now_string(),
                name => row.get(name).cloned().unwrap_or(Value::Null),
            };
            stored.insert(col.name.to_string(), value);
        }
        let stored = Value::Object(stored);
        data.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &TableSchema,
        id: i64,
        changes: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let Some(data) = tables.get_mut(table.table) else {
            return Ok(None);
        };
        let Some(Value::Object(row)) = data.rows.get_mut(&id) else {
            return Ok(None);
        };
        for col in table.writable() {
            if let Some(v) = changes.get(col.name) {
                row.insert(col.name.to_string(), v.clone());
            }
        }
        row.insert("updated_at".to_string(), now_string());
        Ok(Some(Value::Object(row.clone())))
    }

    async fn delete(&self, table: &TableSchema, id: i64) -> Result<Option<Value>, StoreError> {
        let mut tables = self.tables.write().unwrap();
        Ok(tables
            .get_mut(table.table)
            .and_then(|data| data.rows.remove(&id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SchemaSet;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_timestamps() {
        let store = MemoryStore::new();
        let schema = SchemaSet::new().posts;
        let a = store
            .insert(&schema, &body(json!({ "body": "a", "user_id": 1 })))
            .await
            .unwrap();
        let b = store
            .insert(&schema, &body(json!({ "body": "b", "user_id": 1 })))
            .await
            .unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert!(a["created_at"].is_string());
        assert_eq!(a["body"], json!("a"));
    }

    #[tokio::test]
    async fn list_filters_and_pages_by_id_order() {
        let store = MemoryStore::new();
        let schema = SchemaSet::new().posts;
        for (text, user) in [("a", 1), ("b", 2), ("c", 1)] {
            store
                .insert(&schema, &body(json!({ "body": text, "user_id": user })))
                .await
                .unwrap();
        }
        let mine = store
            .list(&schema, &[("user_id".into(), json!(1))], None, None)
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0]["body"], json!("a"));
        assert_eq!(mine[1]["body"], json!("c"));

        let paged = store.list(&schema, &[], Some(1), Some(1)).await.unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0]["body"], json!("b"));
    }

    #[tokio::test]
    async fn update_merges_known_columns_only() {
        let store = MemoryStore::new();
        let schema = SchemaSet::new().posts;
        let row = store
            .insert(&schema, &body(json!({ "body": "orig", "user_id": 1 })))
            .await
            .unwrap();
        let id = row["id"].as_i64().unwrap();
        let updated = store
            .update(&schema, id, &body(json!({ "body": "edited", "bogus": 1 })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["body"], json!("edited"));
        assert!(updated.as_object().unwrap().get("bogus").is_none());
        assert!(store
            .update(&schema, 999, &body(json!({ "body": "x" })))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_row_once() {
        let store = MemoryStore::new();
        let schema = SchemaSet::new().comments;
        let row = store
            .insert(
                &schema,
                &body(json!({ "body": "c", "user_id": 1, "post_id": 1 })),
            )
            .await
            .unwrap();
        let id = row["id"].as_i64().unwrap();
        assert!(store.delete(&schema, id).await.unwrap().is_some());
        assert!(store.delete(&schema, id).await.unwrap().is_none());
        assert!(store.find(&schema, id).await.unwrap().is_none());
    }
}

//! Persistence layer: a storage trait over schema-described tables, with
//! PostgreSQL and in-memory backends. Rows travel as JSON objects keyed by
//! column name.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use crate::entity::TableSchema;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// List rows matching the exact-match filters, ordered by id.
    async fn list(
        &self,
        table: &TableSchema,
        filters: &[(String, Value)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Fetch one row by primary key.
    async fn find(&self, table: &TableSchema, id: i64) -> Result<Option<Value>, StoreError>;

    /// Fetch rows where `column` is in `values`. Used for batch-loading related rows.
    async fn find_where_in(
        &self,
        table: &TableSchema,
        column: &str,
        values: &[Value],
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert one row; generated columns are filled by the backend. Returns the created row.
    async fn insert(&self, table: &TableSchema, row: &Map<String, Value>)
        -> Result<Value, StoreError>;

    /// Update one row by id. Returns the updated row, or None if absent.
    async fn update(
        &self,
        table: &TableSchema,
        id: i64,
        changes: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Delete one row by id. Returns the removed row, or None if absent.
    async fn delete(&self, table: &TableSchema, id: i64) -> Result<Option<Value>, StoreError>;
}

pub(crate) const DEFAULT_LIMIT: u32 = 100;
pub(crate) const MAX_LIMIT: u32 = 1000;

pub(crate) fn clamp_page(limit: Option<u32>, offset: Option<u32>) -> (u32, u32) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        offset.unwrap_or(0),
    )
}

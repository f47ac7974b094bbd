//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a table schema.

use crate::entity::TableSchema;
use serde_json::{Map, Value};

/// Quote an identifier for PostgreSQL (identifiers only come from schema definitions).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> QueryBuf {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn column_list(table: &TableSchema) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key. Caller binds the id as the sole parameter.
pub fn select_by_id(table: &TableSchema) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE \"id\" = $1",
        column_list(table),
        quoted(table.table)
    );
    q
}

/// SELECT list with exact-match filters, ordered by id.
pub fn select_list(
    table: &TableSchema,
    filters: &[(String, Value)],
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if table.column(col).is_some() {
            let n = q.push_param(val.clone());
            where_parts.push(format!("{} = ${}", quoted(col), n));
        }
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY \"id\" LIMIT {} OFFSET {}",
        column_list(table),
        quoted(table.table),
        where_clause,
        limit,
        offset
    );
    q
}

/// SELECT rows where a column is in the given set. Used for batch-loading
/// related rows.
pub fn select_where_in(table: &TableSchema, column: &str, values: &[Value]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders: Vec<String> = values
        .iter()
        .map(|v| format!("${}", q.push_param(v.clone())))
        .collect();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY \"id\"",
        column_list(table),
        quoted(table.table),
        quoted(column),
        placeholders.join(", ")
    );
    q
}

/// INSERT the writable columns present in the row, returning the full row.
pub fn insert(table: &TableSchema, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for col in table.writable() {
        if let Some(v) = row.get(col.name) {
            let n = q.push_param(v.clone());
            cols.push(quoted(col.name));
            placeholders.push(format!("${}", n));
        }
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quoted(table.table),
            column_list(table)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(table.table),
            cols.join(", "),
            placeholders.join(", "),
            column_list(table)
        )
    };
    q
}

/// UPDATE the writable columns present in `changes` by id, bumping
/// `updated_at`, returning the full row. The id is the last parameter.
pub fn update(table: &TableSchema, id: i64, changes: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = vec!["\"updated_at\" = NOW()".to_string()];
    for col in table.writable() {
        if let Some(v) = changes.get(col.name) {
            let n = q.push_param(v.clone());
            sets.push(format!("{} = ${}", quoted(col.name), n));
        }
    }
    let id_param = q.push_param(Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE \"id\" = ${} RETURNING {}",
        quoted(table.table),
        sets.join(", "),
        id_param,
        column_list(table)
    );
    q
}

/// DELETE by primary key, returning the removed row. Caller binds the id.
pub fn delete(table: &TableSchema) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE \"id\" = $1 RETURNING {}",
        quoted(table.table),
        column_list(table)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SchemaSet;
    use serde_json::json;

    #[test]
    fn select_by_id_shape() {
        let q = select_by_id(&SchemaSet::new().posts);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"created_at\", \"updated_at\", \"body\", \"user_id\" \
             FROM \"posts\" WHERE \"id\" = $1"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_list_applies_known_filters_only() {
        let schema = SchemaSet::new().posts;
        let filters = vec![
            ("user_id".to_string(), json!(3)),
            ("bogus".to_string(), json!("x")),
        ];
        let q = select_list(&schema, &filters, 100, 0);
        assert!(q.sql.contains("WHERE \"user_id\" = $1"));
        assert!(!q.sql.contains("bogus"));
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 100 OFFSET 0"));
        assert_eq!(q.params, vec![json!(3)]);
    }

    #[test]
    fn insert_skips_generated_and_unknown_columns() {
        let schema = SchemaSet::new().posts;
        let row = json!({ "body": "hi", "user_id": 1, "id": 99 })
            .as_object()
            .unwrap()
            .clone();
        let q = insert(&schema, &row);
        assert!(q.sql.starts_with("INSERT INTO \"posts\" (\"body\", \"user_id\") VALUES ($1, $2)"));
        assert!(q.sql.contains("RETURNING"));
        assert_eq!(q.params, vec![json!("hi"), json!(1)]);
    }

    #[test]
    fn update_always_bumps_updated_at_and_binds_id_last() {
        let schema = SchemaSet::new().posts;
        let changes = json!({ "body": "edited" }).as_object().unwrap().clone();
        let q = update(&schema, 7, &changes);
        assert!(q.sql.contains("SET \"updated_at\" = NOW(), \"body\" = $1"));
        assert!(q.sql.contains("WHERE \"id\" = $2"));
        assert_eq!(q.params, vec![json!("edited"), json!(7)]);
    }

    #[test]
    fn delete_returns_the_removed_row() {
        let q = delete(&SchemaSet::new().comments);
        assert!(q.sql.starts_with("DELETE FROM \"comments\" WHERE \"id\" = $1 RETURNING"));
    }
}

//! Renders and applies DDL for the entity schemas. Runs once at startup,
//! before the server begins accepting requests.

use crate::entity::{ColumnType, SchemaSet, TableSchema};
use crate::store::StoreError;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// CREATE TABLE IF NOT EXISTS for one schema description.
pub fn create_table_sql(table: &TableSchema) -> String {
    let mut defs: Vec<String> = Vec::new();
    for col in &table.columns {
        let mut def = format!("{} {}", quote(col.name), col.ty.sql_name());
        // BIGSERIAL implies NOT NULL and a sequence default.
        if col.ty != ColumnType::BigSerial {
            if !col.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(default) = col.default {
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
        }
        if col.unique {
            def.push_str(" UNIQUE");
        }
        defs.push(def);
    }
    defs.push("PRIMARY KEY (\"id\")".to_string());
    for col in &table.columns {
        if let Some(referenced) = col.references {
            defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} (\"id\") ON DELETE CASCADE",
                quote(col.name),
                quote(referenced)
            ));
        }
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(table.table),
        defs.join(", ")
    )
}

/// Apply DDL for all entity tables. Referenced tables are created first.
pub async fn apply_migrations(pool: &PgPool, schema: &SchemaSet) -> Result<(), StoreError> {
    for table in [&schema.users, &schema.posts, &schema.comments] {
        let sql = create_table_sql(table);
        tracing::debug!(sql = %sql, "migrate");
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SchemaSet;

    #[test]
    fn posts_ddl_has_pk_fk_and_timestamps() {
        let sql = create_table_sql(&SchemaSet::new().posts);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"posts\""));
        assert!(sql.contains("\"id\" BIGSERIAL"));
        assert!(sql.contains("\"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(sql.contains("\"body\" TEXT NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (\"id\")"));
        assert!(sql.contains("FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\")"));
    }

    #[test]
    fn users_ddl_marks_unique_columns() {
        let sql = create_table_sql(&SchemaSet::new().users);
        assert!(sql.contains("\"username\" TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("\"email\" TEXT NOT NULL UNIQUE"));
    }
}

//! Schema-description objects handed to the persistence layer and the validator.

use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    BigSerial,
    BigInt,
    Text,
    Timestamptz,
}

impl ColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::BigSerial => "BIGSERIAL",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamptz => "TIMESTAMPTZ",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Email,
}

#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    /// Must be present and non-empty on create.
    pub required: bool,
    /// Unique constraint in the database; checked by controllers as well so the
    /// in-memory backend behaves the same.
    pub unique: bool,
    /// Never exposed in API responses.
    pub sensitive: bool,
    /// Populated by the store, not by clients (id, timestamps).
    pub generated: bool,
    pub format: Option<Format>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<&'static str>,
    /// Referenced table name for foreign keys.
    pub references: Option<&'static str>,
    /// SQL default expression.
    pub default: Option<&'static str>,
}

impl ColumnDef {
    pub fn new(name: &'static str, ty: ColumnType) -> ColumnDef {
        ColumnDef {
            name,
            ty,
            nullable: false,
            required: false,
            unique: false,
            sensitive: false,
            generated: false,
            format: None,
            min_length: None,
            max_length: None,
            pattern: None,
            references: None,
            default: None,
        }
    }

    pub fn text(name: &'static str) -> ColumnDef {
        ColumnDef::new(name, ColumnType::Text)
    }

    pub fn big_int(name: &'static str) -> ColumnDef {
        ColumnDef::new(name, ColumnType::BigInt)
    }
}

#[derive(Clone, Debug)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Base columns every table carries. The store maintains all three.
    fn base_columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef {
                generated: true,
                ..ColumnDef::new("id", ColumnType::BigSerial)
            },
            ColumnDef {
                generated: true,
                default: Some("NOW()"),
                ..ColumnDef::new("created_at", ColumnType::Timestamptz)
            },
            ColumnDef {
                generated: true,
                default: Some("NOW()"),
                ..ColumnDef::new("updated_at", ColumnType::Timestamptz)
            },
        ]
    }

    pub fn new(table: &'static str, columns: Vec<ColumnDef>) -> TableSchema {
        let mut all = Self::base_columns();
        all.extend(columns);
        TableSchema { table, columns: all }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns clients may write.
    pub fn writable(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.generated)
    }

    /// Drop keys that do not name a writable column.
    pub fn retain_known(&self, body: &mut Map<String, Value>) {
        body.retain(|k, _| self.column(k).map(|c| !c.generated).unwrap_or(false));
    }

    /// Remove sensitive columns from an outgoing row.
    pub fn strip_sensitive(&self, row: &mut Value) {
        if let Value::Object(map) = row {
            for col in self.columns.iter().filter(|c| c.sensitive) {
                map.remove(col.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TableSchema {
        TableSchema::new(
            "things",
            vec![
                ColumnDef {
                    required: true,
                    ..ColumnDef::text("body")
                },
                ColumnDef {
                    sensitive: true,
                    ..ColumnDef::text("secret")
                },
            ],
        )
    }

    #[test]
    fn base_columns_are_generated() {
        let schema = sample();
        for name in ["id", "created_at", "updated_at"] {
            assert!(schema.column(name).unwrap().generated, "{name}");
        }
        assert!(!schema.column("body").unwrap().generated);
    }

    #[test]
    fn retain_known_drops_unknown_and_generated_keys() {
        let schema = sample();
        let mut body = json!({ "body": "x", "id": 9, "bogus": true })
            .as_object()
            .unwrap()
            .clone();
        schema.retain_known(&mut body);
        assert_eq!(body.len(), 1);
        assert!(body.contains_key("body"));
    }

    #[test]
    fn strip_sensitive_removes_marked_columns() {
        let schema = sample();
        let mut row = json!({ "id": 1, "body": "x", "secret": "hunter2" });
        schema.strip_sensitive(&mut row);
        assert_eq!(row, json!({ "id": 1, "body": "x" }));
        // idempotent
        let again = row.clone();
        let mut row2 = row;
        schema.strip_sensitive(&mut row2);
        assert_eq!(row2, again);
    }
}

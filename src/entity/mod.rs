//! Entity definitions: typed records plus the schema descriptions the store consumes.

pub mod schema;

pub use schema::{ColumnDef, ColumnType, Format, TableSchema};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All entity schemas, resolved once at startup and shared through [`crate::state::AppState`].
#[derive(Clone, Debug)]
pub struct SchemaSet {
    pub users: TableSchema,
    pub posts: TableSchema,
    pub comments: TableSchema,
}

impl SchemaSet {
    pub fn new() -> SchemaSet {
        SchemaSet {
            users: users_schema(),
            posts: posts_schema(),
            comments: comments_schema(),
        }
    }
}

impl Default for SchemaSet {
    fn default() -> Self {
        SchemaSet::new()
    }
}

fn users_schema() -> TableSchema {
    TableSchema::new(
        "users",
        vec![
            ColumnDef {
                required: true,
                unique: true,
                min_length: Some(3),
                max_length: Some(32),
                pattern: Some("^[A-Za-z0-9_]+$"),
                ..ColumnDef::text("username")
            },
            ColumnDef {
                required: true,
                unique: true,
                format: Some(Format::Email),
                max_length: Some(254),
                ..ColumnDef::text("email")
            },
            ColumnDef {
                required: true,
                sensitive: true,
                min_length: Some(8),
                ..ColumnDef::text("password")
            },
        ],
    )
}

fn posts_schema() -> TableSchema {
    TableSchema::new(
        "posts",
        vec![
            ColumnDef {
                required: true,
                ..ColumnDef::text("body")
            },
            ColumnDef {
                required: true,
                references: Some("users"),
                ..ColumnDef::big_int("user_id")
            },
        ],
    )
}

fn comments_schema() -> TableSchema {
    TableSchema::new(
        "comments",
        vec![
            ColumnDef {
                required: true,
                ..ColumnDef::text("body")
            },
            ColumnDef {
                required: true,
                references: Some("users"),
                ..ColumnDef::big_int("user_id")
            },
            ColumnDef {
                required: true,
                references: Some("posts"),
                ..ColumnDef::big_int("post_id")
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_set_tables() {
        let set = SchemaSet::new();
        assert_eq!(set.users.table, "users");
        assert_eq!(set.posts.table, "posts");
        assert_eq!(set.comments.table, "comments");
        assert!(set.users.column("password").unwrap().sensitive);
        assert_eq!(set.posts.column("user_id").unwrap().references, Some("users"));
    }

    #[test]
    fn post_record_deserializes_from_row() {
        let row = json!({
            "id": 7,
            "body": "hello",
            "user_id": 3,
            "created_at": "2024-05-01T12:00:00+00:00",
            "updated_at": "2024-05-01T12:00:00+00:00"
        });
        let post: Post = serde_json::from_value(row).unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.user_id, 3);
    }
}

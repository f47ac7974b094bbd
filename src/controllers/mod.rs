//! Per-resource controllers. The dispatcher builds one instance per request.

mod comment;
mod post;
mod user;

pub use comment::{CommentController, CommentFactory};
pub use post::{PostController, PostFactory};
pub use user::{UserController, UserFactory};

use crate::error::HttpError;
use crate::state::AppState;
use serde_json::Value;

/// Embed the author row under a `user` key on each row carrying a `user_id`.
/// Authors are batch-loaded in one query; sensitive columns are stripped.
pub(crate) async fn attach_authors(
    state: &AppState,
    rows: &mut [Value],
) -> Result<(), HttpError> {
    let mut ids: Vec<Value> = Vec::new();
    for row in rows.iter() {
        if let Some(id) = row.get("user_id") {
            if !id.is_null() && !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    if ids.is_empty() {
        return Ok(());
    }

    let users = state
        .store
        .find_where_in(&state.schema.users, "id", &ids)
        .await?;
    for row in rows.iter_mut() {
        let author = row.get("user_id").and_then(|id| {
            users
                .iter()
                .find(|u| u.get("id") == Some(id))
                .cloned()
        });
        if let (Some(map), Some(mut author)) = (row.as_object_mut(), author) {
            state.schema.users.strip_sensitive(&mut author);
            map.insert("user".to_string(), author);
        }
    }
    Ok(())
}

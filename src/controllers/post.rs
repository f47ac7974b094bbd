//! Post actions: list, get, create, update, delete.

use super::attach_authors;
use crate::dispatch::{Action, ActionResult, Controller, ControllerFactory, RequestContext};
use crate::entity::Post;
use crate::error::{HttpError, Violation};
use crate::state::AppState;
use crate::validation;
use async_trait::async_trait;
use serde_json::Value;

pub struct PostFactory;

impl ControllerFactory for PostFactory {
    fn name(&self) -> &'static str {
        "posts"
    }

    fn supported_actions(&self) -> &'static [Action] {
        &[
            Action::List,
            Action::Get,
            Action::Create,
            Action::Update,
            Action::Delete,
        ]
    }

    fn build(&self, state: &AppState) -> Box<dyn Controller> {
        Box::new(PostController {
            state: state.clone(),
        })
    }
}

pub struct PostController {
    state: AppState,
}

impl PostController {
    /// Load the stored post for an ownership-guarded action. `None` means the
    /// row is absent and the caller answers with the not-found envelope.
    async fn owned_post(&self, ctx: &RequestContext, id: i64) -> Result<Option<Post>, HttpError> {
        let Some(row) = self.state.store.find(&self.state.schema.posts, id).await? else {
            return Ok(None);
        };
        let post: Post = serde_json::from_value(row)
            .map_err(|e| HttpError::Internal(format!("malformed post row: {e}")))?;
        if Some(post.user_id) != ctx.current_user {
            return Err(HttpError::action_not_allowed());
        }
        Ok(Some(post))
    }
}

#[async_trait]
impl Controller for PostController {
    async fn list(&self, ctx: &mut RequestContext) -> ActionResult {
        let mut filters = Vec::new();
        if let Some(user_id) = ctx.query_i64("user_id")? {
            filters.push(("user_id".to_string(), Value::from(user_id)));
        }
        let mut rows = self
            .state
            .store
            .list(
                &self.state.schema.posts,
                &filters,
                ctx.query_u32("limit"),
                ctx.query_u32("offset"),
            )
            .await?;
        attach_authors(&self.state, &mut rows).await?;
        Ok(Some(Value::Array(rows)))
    }

    async fn get(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        let Some(row) = self.state.store.find(&self.state.schema.posts, id).await? else {
            return Ok(None);
        };
        let mut rows = vec![row];
        attach_authors(&self.state, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn create(&self, ctx: &mut RequestContext) -> ActionResult {
        let schema = &self.state.schema.posts;
        let mut body = ctx.body_object()?;
        validation::validate_create(schema, &body)?;
        schema.retain_known(&mut body);

        let user_id = body
            .get("user_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| HttpError::BadRequest("userId must be a number".into()))?;
        if self
            .state
            .store
            .find(&self.state.schema.users, user_id)
            .await?
            .is_none()
        {
            return Err(HttpError::input_error(vec![Violation::new(
                "userId",
                "userId must reference an existing user",
            )]));
        }

        let row = self.state.store.insert(schema, &body).await?;
        let mut rows = vec![row];
        attach_authors(&self.state, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn update(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        ctx.require_user()?;
        if self.owned_post(ctx, id).await?.is_none() {
            return Ok(None);
        }

        let schema = &self.state.schema.posts;
        let mut changes = ctx.body_object()?;
        validation::validate_update(schema, &changes)?;
        schema.retain_known(&mut changes);
        // Authorship never changes.
        changes.remove("user_id");

        let updated = self.state.store.update(schema, id, &changes).await?;
        let mut rows: Vec<Value> = updated.into_iter().collect();
        attach_authors(&self.state, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn delete(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        ctx.require_user()?;
        if self.owned_post(ctx, id).await?.is_none() {
            return Ok(None);
        }
        let removed = self
            .state
            .store
            .delete(&self.state.schema.posts, id)
            .await?;
        Ok(removed)
    }
}

//! Comment actions: list, get, create, update, delete.

use super::attach_authors;
use crate::dispatch::{Action, ActionResult, Controller, ControllerFactory, RequestContext};
use crate::entity::Comment;
use crate::error::{HttpError, Violation};
use crate::state::AppState;
use crate::validation;
use async_trait::async_trait;
use serde_json::Value;

pub struct CommentFactory;

impl ControllerFactory for CommentFactory {
    fn name(&self) -> &'static str {
        "comments"
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
        Box::new(CommentController {
            state: state.clone(),
        })
    }
}

pub struct CommentController {
    state: AppState,
}

impl CommentController {
    async fn owned_comment(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<Comment>, HttpError> {
        let Some(row) = self
            .state
            .store
            .find(&self.state.schema.comments, id)
            .await?
        else {
            return Ok(None);
        };
        let comment: Comment = serde_json::from_value(row)
            .map_err(|e| HttpError::Internal(format!("malformed comment row: {e}")))?;
        if Some(comment.user_id) != ctx.current_user {
            return Err(HttpError::action_not_allowed());
        }
        Ok(Some(comment))
    }
}

#[async_trait]
impl Controller for CommentController {
    async fn list(&self, ctx: &mut RequestContext) -> ActionResult {
        let mut filters = Vec::new();
        for column in ["post_id", "user_id"] {
            if let Some(id) = ctx.query_i64(column)? {
                filters.push((column.to_string(), Value::from(id)));
            }
        }
        let mut rows = self
            .state
            .store
            .list(
                &self.state.schema.comments,
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
        let Some(row) = self
            .state
            .store
            .find(&self.state.schema.comments, id)
            .await?
        else {
            return Ok(None);
        };
        let mut rows = vec![row];
        attach_authors(&self.state, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn create(&self, ctx: &mut RequestContext) -> ActionResult {
        let schema = &self.state.schema.comments;
        let mut body = ctx.body_object()?;
        validation::validate_create(schema, &body)?;
        schema.retain_known(&mut body);

        let mut violations = Vec::new();
        for (column, table, field, noun) in [
            ("user_id", &self.state.schema.users, "userId", "user"),
            ("post_id", &self.state.schema.posts, "postId", "post"),
        ] {
            let exists = match body.get(column).and_then(Value::as_i64) {
                Some(id) => self.state.store.find(table, id).await?.is_some(),
                None => false,
            };
            if !exists {
                violations.push(Violation::new(
                    field,
                    format!("{field} must reference an existing {noun}"),
                ));
            }
        }
        if !violations.is_empty() {
            return Err(HttpError::input_error(violations));
        }

        let row = self.state.store.insert(schema, &body).await?;
        let mut rows = vec![row];
        attach_authors(&self.state, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn update(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        ctx.require_user()?;
        if self.owned_comment(ctx, id).await?.is_none() {
            return Ok(None);
        }

        let schema = &self.state.schema.comments;
        let mut changes = ctx.body_object()?;
        validation::validate_update(schema, &changes)?;
        schema.retain_known(&mut changes);
        // Neither authorship nor the target post changes.
        changes.remove("user_id");
        changes.remove("post_id");

        let updated = self.state.store.update(schema, id, &changes).await?;
        let mut rows: Vec<Value> = updated.into_iter().collect();
        attach_authors(&self.state, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn delete(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        ctx.require_user()?;
        if self.owned_comment(ctx, id).await?.is_none() {
            return Ok(None);
        }
        let removed = self
            .state
            .store
            .delete(&self.state.schema.comments, id)
            .await?;
        Ok(removed)
    }
}

//! User actions: list, get, create, update, delete. Responses never include
//! sensitive columns; passwords are stored as SHA-256 hex digests.

use crate::dispatch::{Action, ActionResult, Controller, ControllerFactory, RequestContext};
use crate::error::HttpError;
use crate::state::AppState;
use crate::validation;
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub struct UserFactory;

impl ControllerFactory for UserFactory {
    fn name(&self) -> &'static str {
        "users"
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
        Box::new(UserController {
            state: state.clone(),
        })
    }
}

pub struct UserController {
    state: AppState,
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl UserController {
    /// Duplicate username/email would surface as a unique-violation 500 from
    /// the database; check up front and answer 409 instead. Also keeps the
    /// in-memory backend consistent with PostgreSQL.
    async fn check_unique(
        &self,
        column: &str,
        value: &Value,
        exclude_id: Option<i64>,
    ) -> Result<(), HttpError> {
        let filters = vec![(column.to_string(), value.clone())];
        let existing = self
            .state
            .store
            .list(&self.state.schema.users, &filters, Some(1), None)
            .await?;
        let taken = existing
            .iter()
            .any(|row| row.get("id").and_then(Value::as_i64) != exclude_id);
        if taken {
            return Err(HttpError::Conflict(format!("{column} already taken")));
        }
        Ok(())
    }

    fn stripped(&self, mut row: Value) -> Value {
        self.state.schema.users.strip_sensitive(&mut row);
        row
    }
}

#[async_trait]
impl Controller for UserController {
    async fn list(&self, ctx: &mut RequestContext) -> ActionResult {
        let rows = self
            .state
            .store
            .list(
                &self.state.schema.users,
                &[],
                ctx.query_u32("limit"),
                ctx.query_u32("offset"),
            )
            .await?;
        let rows: Vec<Value> = rows.into_iter().map(|r| self.stripped(r)).collect();
        Ok(Some(Value::Array(rows)))
    }

    async fn get(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        let row = self.state.store.find(&self.state.schema.users, id).await?;
        Ok(row.map(|r| self.stripped(r)))
    }

    async fn create(&self, ctx: &mut RequestContext) -> ActionResult {
        let schema = &self.state.schema.users;
        let mut body = ctx.body_object()?;
        validation::validate_create(schema, &body)?;
        schema.retain_known(&mut body);

        for column in ["username", "email"] {
            if let Some(value) = body.get(column).cloned() {
                self.check_unique(column, &value, None).await?;
            }
        }
        if let Some(Value::String(password)) = body.get("password").cloned() {
            body.insert("password".to_string(), Value::String(hash_password(&password)));
        }

        let row = self.state.store.insert(schema, &body).await?;
        Ok(Some(self.stripped(row)))
    }

    async fn update(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        let user = ctx.require_user()?;
        let schema = &self.state.schema.users;
        if self.state.store.find(schema, id).await?.is_none() {
            return Ok(None);
        }
        if user != id {
            return Err(HttpError::action_not_allowed());
        }

        let mut changes = ctx.body_object()?;
        validation::validate_update(schema, &changes)?;
        schema.retain_known(&mut changes);
        for column in ["username", "email"] {
            if let Some(value) = changes.get(column).cloned() {
                self.check_unique(column, &value, Some(id)).await?;
            }
        }
        if let Some(Value::String(password)) = changes.get("password").cloned() {
            changes.insert("password".to_string(), Value::String(hash_password(&password)));
        }

        let updated = self.state.store.update(schema, id, &changes).await?;
        Ok(updated.map(|r| self.stripped(r)))
    }

    async fn delete(&self, ctx: &mut RequestContext) -> ActionResult {
        let id = ctx.id_param()?;
        let user = ctx.require_user()?;
        let schema = &self.state.schema.users;
        if self.state.store.find(schema, id).await?.is_none() {
            return Ok(None);
        }
        if user != id {
            return Err(HttpError::action_not_allowed());
        }
        let removed = self.state.store.delete(schema, id).await?;
        Ok(removed.map(|r| self.stripped(r)))
    }
}

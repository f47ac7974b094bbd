//! Request-scoped middleware implementations.

use crate::dispatch::{Middleware, RequestContext};
use crate::error::HttpError;
use async_trait::async_trait;

/// Resolves the calling user from the `x-user-id` header (set by the edge
/// gateway) and rejects the request when it is missing or names no known user.
pub struct RequireUser;

#[async_trait]
impl Middleware for RequireUser {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), HttpError> {
        let raw = ctx
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| HttpError::Unauthorized("missing x-user-id header".into()))?;
        let id: i64 = raw
            .parse()
            .map_err(|_| HttpError::Unauthorized(format!("invalid x-user-id '{raw}'")))?;
        let schema = ctx.state.schema.clone();
        if ctx.state.store.find(&schema.users, id).await?.is_none() {
            return Err(HttpError::Unauthorized(format!("unknown user {id}")));
        }
        ctx.current_user = Some(id);
        Ok(())
    }
}

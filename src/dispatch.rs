//! Route table and dispatch: binds declarative route descriptors to the HTTP
//! router and normalizes every action outcome into one of the response
//! envelopes.
//!
//! A descriptor is registered exactly once at startup. Per matching request the
//! dispatcher builds a [`RequestContext`], runs the descriptor's middlewares,
//! constructs a fresh controller, invokes the named action, and answers:
//! a present value becomes the success envelope, an absent value the not-found
//! envelope, and an error propagates untouched to the centralized translation
//! in [`crate::error`].

use crate::case;
use crate::error::{ConfigError, HttpError};
use crate::response;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query, RawPathParams, Request},
    http::HeaderMap,
    response::Response,
    routing, Router,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Get => "get",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// What an action resolves to: a JSON payload, absence, or a typed error.
pub type ActionResult = Result<Option<Value>, HttpError>;

/// Everything an action can see about the current request.
pub struct RequestContext {
    pub state: AppState,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Set by the auth middleware; absent on anonymous requests.
    pub current_user: Option<i64>,
}

impl RequestContext {
    pub async fn from_request(req: Request, state: AppState) -> Result<RequestContext, HttpError> {
        let (mut parts, body) = req.into_parts();

        let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => HashMap::new(),
        };

        let query = Query::<HashMap<String, String>>::from_request_parts(&mut parts, &())
            .await
            .map(|Query(q)| {
                q.into_iter()
                    .map(|(k, v)| (case::to_snake_case(&k), v))
                    .collect()
            })
            .unwrap_or_default();

        let bytes = axum::body::to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| HttpError::BadRequest(format!("unreadable body: {e}")))?;
        let body = if bytes.is_empty() {
            None
        } else {
            let mut value: Value = serde_json::from_slice(&bytes)
                .map_err(|e| HttpError::BadRequest(format!("invalid json body: {e}")))?;
            if let Value::Object(map) = &mut value {
                case::object_keys_to_snake_case(map);
            }
            Some(value)
        };

        Ok(RequestContext {
            state,
            params,
            query,
            body,
            headers: parts.headers,
            current_user: None,
        })
    }

    /// The `:id` path segment, parsed.
    pub fn id_param(&self) -> Result<i64, HttpError> {
        let raw = self
            .params
            .get("id")
            .ok_or_else(|| HttpError::Internal("route has no :id segment".into()))?;
        raw.parse()
            .map_err(|_| HttpError::BadRequest(format!("invalid id '{raw}'")))
    }

    /// The request body as a JSON object.
    pub fn body_object(&self) -> Result<serde_json::Map<String, Value>, HttpError> {
        match &self.body {
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(HttpError::BadRequest("body must be a JSON object".into())),
            None => Ok(serde_json::Map::new()),
        }
    }

    pub fn query_i64(&self, name: &str) -> Result<Option<i64>, HttpError> {
        match self.query.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| HttpError::BadRequest(format!("invalid {name} '{raw}'"))),
        }
    }

    pub fn query_u32(&self, name: &str) -> Option<u32> {
        self.query.get(name).and_then(|s| s.parse().ok())
    }

    /// The authenticated user, or 401 if no middleware resolved one.
    pub fn require_user(&self) -> Result<i64, HttpError> {
        self.current_user
            .ok_or_else(|| HttpError::Unauthorized("authentication required".into()))
    }
}

/// A controller serves exactly one request; the dispatcher builds a fresh
/// instance per invocation, so implementations hold no cross-request state.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn list(&self, _ctx: &mut RequestContext) -> ActionResult {
        Err(HttpError::Internal("action not implemented".into()))
    }
    async fn get(&self, _ctx: &mut RequestContext) -> ActionResult {
        Err(HttpError::Internal("action not implemented".into()))
    }
    async fn create(&self, _ctx: &mut RequestContext) -> ActionResult {
        Err(HttpError::Internal("action not implemented".into()))
    }
    async fn update(&self, _ctx: &mut RequestContext) -> ActionResult {
        Err(HttpError::Internal("action not implemented".into()))
    }
    async fn delete(&self, _ctx: &mut RequestContext) -> ActionResult {
        Err(HttpError::Internal("action not implemented".into()))
    }
}

/// Builds controller instances and declares the actions they support. The
/// declaration is checked against the route table at startup.
pub trait ControllerFactory: Send + Sync {
    fn name(&self) -> &'static str;
    fn supported_actions(&self) -> &'static [Action];
    fn build(&self, state: &AppState) -> Box<dyn Controller>;
}

/// Request-scoped middleware, run in declaration order before the action.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), HttpError>;
}

/// One route declaration. Immutable once registered.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    pub path: &'static str,
    pub controller: Arc<dyn ControllerFactory>,
    pub action: Action,
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl RouteDescriptor {
    pub fn new(
        method: Method,
        path: &'static str,
        controller: impl ControllerFactory + 'static,
        action: Action,
    ) -> RouteDescriptor {
        RouteDescriptor {
            method,
            path,
            controller: Arc::new(controller),
            action,
            middlewares: Vec::new(),
        }
    }

    pub fn with(mut self, middleware: impl Middleware + 'static) -> RouteDescriptor {
        self.middlewares.push(Arc::new(middleware));
        self
    }
}

/// Register every descriptor on a fresh router, in declaration order.
///
/// A descriptor naming an action its controller does not support, or repeating
/// a method+path pair, is a configuration error: the router is not built and
/// the process must not start serving.
pub fn bind_routes(
    descriptors: Vec<RouteDescriptor>,
    state: AppState,
) -> Result<Router, ConfigError> {
    let mut router = Router::new();
    let mut seen: HashSet<(Method, &'static str)> = HashSet::new();

    for descriptor in descriptors {
        if !descriptor
            .controller
            .supported_actions()
            .contains(&descriptor.action)
        {
            return Err(ConfigError::UnsupportedAction {
                controller: descriptor.controller.name(),
                action: descriptor.action.as_str(),
            });
        }
        if !seen.insert((descriptor.method, descriptor.path)) {
            return Err(ConfigError::DuplicateRoute {
                method: descriptor.method.as_str(),
                path: descriptor.path,
            });
        }

        let path = descriptor.path;
        let method = descriptor.method;
        let st = state.clone();
        let handler = move |req: Request| {
            let descriptor = descriptor.clone();
            let st = st.clone();
            async move { dispatch(descriptor, st, req).await }
        };
        let method_router = match method {
            Method::Get => routing::get(handler),
            Method::Post => routing::post(handler),
            Method::Put => routing::put(handler),
            Method::Patch => routing::patch(handler),
            Method::Delete => routing::delete(handler),
        };
        router = router.route(path, method_router);
    }
    Ok(router)
}

/// Serve one request through a descriptor: context, middleware chain, a fresh
/// controller, then outcome normalization. Errors are returned, never rendered
/// here; the translation stage in [`crate::error`] owns that.
async fn dispatch(
    descriptor: RouteDescriptor,
    state: AppState,
    req: Request,
) -> Result<Response, HttpError> {
    let mut ctx = RequestContext::from_request(req, state).await?;
    for middleware in &descriptor.middlewares {
        middleware.handle(&mut ctx).await?;
    }
    let controller = descriptor.controller.build(&ctx.state);
    let outcome = match descriptor.action {
        Action::List => controller.list(&mut ctx).await,
        Action::Get => controller.get(&mut ctx).await,
        Action::Create => controller.create(&mut ctx).await,
        Action::Update => controller.update(&mut ctx).await,
        Action::Delete => controller.delete(&mut ctx).await,
    };
    match outcome? {
        Some(value) => Ok(response::success(value)),
        None => Ok(response::not_found()),
    }
}

//! The application route table: ordered declarations, independent of the HTTP
//! framework. Declaration order is registration order.

use crate::controllers::{CommentFactory, PostFactory, UserFactory};
use crate::dispatch::{Action, Method, RouteDescriptor};
use crate::middleware::RequireUser;

pub fn routes() -> Vec<RouteDescriptor> {
    vec![
        // posts
        RouteDescriptor::new(Method::Get, "/posts", PostFactory, Action::List),
        RouteDescriptor::new(Method::Get, "/posts/:id", PostFactory, Action::Get),
        RouteDescriptor::new(Method::Post, "/posts", PostFactory, Action::Create),
        RouteDescriptor::new(Method::Patch, "/posts/:id", PostFactory, Action::Update)
            .with(RequireUser),
        RouteDescriptor::new(Method::Delete, "/posts/:id", PostFactory, Action::Delete)
            .with(RequireUser),
        // users
        RouteDescriptor::new(Method::Get, "/users", UserFactory, Action::List),
        RouteDescriptor::new(Method::Get, "/users/:id", UserFactory, Action::Get),
        RouteDescriptor::new(Method::Post, "/users", UserFactory, Action::Create),
        RouteDescriptor::new(Method::Patch, "/users/:id", UserFactory, Action::Update)
            .with(RequireUser),
        RouteDescriptor::new(Method::Delete, "/users/:id", UserFactory, Action::Delete)
            .with(RequireUser),
        // comments
        RouteDescriptor::new(Method::Get, "/comments", CommentFactory, Action::List),
        RouteDescriptor::new(Method::Get, "/comments/:id", CommentFactory, Action::Get),
        RouteDescriptor::new(Method::Post, "/comments", CommentFactory, Action::Create),
        RouteDescriptor::new(Method::Patch, "/comments/:id", CommentFactory, Action::Update)
            .with(RequireUser),
        RouteDescriptor::new(Method::Delete, "/comments/:id", CommentFactory, Action::Delete)
            .with(RequireUser),
    ]
}

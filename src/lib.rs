//! REST backend for posts, users, and comments.

pub mod app;
pub mod case;
pub mod config;
pub mod controllers;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;
pub mod validation;

pub use app::{setup_db, Application};
pub use config::{AppConfig, Environment};
pub use dispatch::{bind_routes, Action, Method, RouteDescriptor};
pub use entity::SchemaSet;
pub use error::{ConfigError, HttpError, Violation};
pub use state::AppState;
pub use store::{MemoryStore, PgStore, Store};

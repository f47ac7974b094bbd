//! Application shell: middleware stack, route binding, database setup, and
//! server startup.

use crate::config::AppConfig;
use crate::dispatch::bind_routes;
use crate::entity::SchemaSet;
use crate::error::{error_body, ConfigError};
use crate::migration;
use crate::routes;
use crate::state::AppState;
use crate::store::StoreError;
use axum::{
    extract::OriginalUri,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub struct Application {
    state: AppState,
    router: Router,
}

impl Application {
    /// Wire the middleware stack and the dispatched route table. Fails when
    /// the route table is misconfigured; a broken table must never serve.
    pub fn build(state: AppState) -> Result<Application, ConfigError> {
        let api = bind_routes(routes::routes(), state.clone())?;

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = Router::new()
            .route("/", get(hello))
            .nest("/api", api)
            .fallback(unknown_route)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        Ok(Application { state, router })
    }

    /// The full router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured host/port and serve until the process ends.
    pub async fn serve(self) -> std::io::Result<()> {
        let config = &self.state.config;
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("server started at http://{}", listener.local_addr()?);
        axum::serve(listener, self.router).await
    }
}

/// One-shot database setup: connect, then apply DDL for the entity schemas.
/// Must complete before the server starts accepting requests.
pub async fn setup_db(config: &AppConfig, schema: &SchemaSet) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    migration::apply_migrations(&pool, schema).await?;
    Ok(pool)
}

async fn hello() -> impl IntoResponse {
    Json(json!({ "message": "hello world" }))
}

/// Unknown-route stage: any path/method with no registered handler. Distinct
/// body shape from the not-found envelope a null action result produces.
async fn unknown_route(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(error_body(
            "route_not_found",
            format!("no route for {} {}", method, uri.path()),
            None,
        )),
    )
}

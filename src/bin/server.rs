//! HTTP server binary: loads config, prepares the database, serves the API.
//!
//! Environment:
//! - `HOST` (default 0.0.0.0), `PORT` (default 3000)
//! - `DATABASE_URL` PostgreSQL connection string
//! - `APP_ENV` development | test | production
//! - `RUST_LOG` tracing filter (default `blog_api=info,tower_http=info`)

use blog_api::{setup_db, AppConfig, AppState, Application, Environment, PgStore, SchemaSet};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    if config.environment != Environment::Test {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("blog_api=info,tower_http=info")),
            )
            .init();
    }

    let schema = SchemaSet::new();
    let pool = setup_db(&config, &schema).await?;
    tracing::info!("database ready");

    let state = AppState::new(config, Arc::new(PgStore::new(pool)));
    let app = Application::build(state)?;
    app.serve().await?;
    Ok(())
}

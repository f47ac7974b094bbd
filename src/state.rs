//! Shared application context, constructed once at startup and cloned into every handler.

use crate::config::AppConfig;
use crate::entity::SchemaSet;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub schema: Arc<SchemaSet>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> AppState {
        AppState {
            config: Arc::new(config),
            store,
            schema: Arc::new(SchemaSet::new()),
        }
    }
}

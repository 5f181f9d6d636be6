//! Application state for connect service.

use common::config::AppConfig;

use crate::catalog::{catalog, Catalog};
use crate::sheet::{connect_schema, ConnectSchema};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: &'static Catalog,
    pub schema: &'static ConnectSchema,
}

impl AppState {
    /// Creates a new application state backed by the built-in catalog and schema.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            catalog: catalog(),
            schema: connect_schema(),
        }
    }
}

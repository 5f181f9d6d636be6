//! Application state for connection service.

use common::config::AppConfig;

use crate::service::ConnectionStringService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: ConnectionStringService,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            service: ConnectionStringService::new(),
        }
    }
}

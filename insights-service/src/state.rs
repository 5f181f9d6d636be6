//! Application state for insights service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::selection::QuerySelectionStore;
use crate::service::InsightsService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: InsightsService,
}

impl AppState {
    /// Creates a new application state around `store`.
    pub fn new(config: AppConfig, store: Arc<QuerySelectionStore>) -> Self {
        Self {
            config,
            service: InsightsService::new(store),
        }
    }
}

//! Application state for gateway service.

use common::config::{AppConfig, ServiceUrls};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service_urls: ServiceUrls,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Creates a new application state; the client times out after `service_urls.timeout`.
    pub fn new(config: AppConfig, service_urls: ServiceUrls) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(service_urls.timeout)
            .build()?;

        Ok(Self {
            config,
            service_urls,
            http_client,
        })
    }
}

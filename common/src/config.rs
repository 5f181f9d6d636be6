//! Service configuration.
//!
//! Configuration comes from environment variables, optionally seeded from a
//! `.env` file in the working directory.

use std::time::Duration;

/// Default bind host for every service.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port when neither the caller nor `SERVER_PORT` sets one.
const DEFAULT_PORT: u16 = 8080;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Configuration shared by all services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name reported in health checks and response metadata.
    pub service_name: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads the configuration for the named service.
    ///
    /// `SERVER_PORT` wins over `default_port`.
    pub fn load_with_service(service_name: &str, default_port: u16) -> Self {
        Self {
            service_name: service_name.to_string(),
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env_parse("SERVER_PORT").unwrap_or(default_port),
            log_format: std::env::var("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Socket address string (`host:port`).
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "studio".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Upstream service locations used by the gateway.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    pub connection_service: String,
    pub connect_service: String,
    pub insights_service: String,
    /// Timeout for proxied requests.
    pub timeout: Duration,
}

impl ServiceUrls {
    /// Loads upstream URLs from the environment, falling back to localhost.
    pub fn load() -> Self {
        Self {
            connection_service: std::env::var("CONNECTION_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8081".to_string()),
            connect_service: std::env::var("CONNECT_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8082".to_string()),
            insights_service: std::env::var("INSIGHTS_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8083".to_string()),
            timeout: Duration::from_secs(env_parse("GATEWAY_TIMEOUT_SECS").unwrap_or(30)),
        }
    }
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

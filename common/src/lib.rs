//! Shared building blocks for the studio micro-services.
//!
//! Every service depends on this crate for its models, configuration,
//! error type, response envelope and request middleware.

pub mod config;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod response;

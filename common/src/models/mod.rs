//! Shared data models for all microservices.

pub mod connect;
pub mod connection;
pub mod insights;

// Re-export commonly used types
pub use connect::{ConnectTab, ConnectionType, Resolution, Selection};
pub use connection::{
    AnnotateSyntaxRequest, BuildConnectionStringsRequest, ConnectionInfo, ConnectionMetadata,
    ConnectionStringSet, ConnectionStrings, Dialect, PoolingInfo, SyntaxOptions, SyntaxToken,
};
pub use insights::{
    ChartData, ChartPoint, ChartRequest, MetricBadge, MetricType, QueryInsightsMetric,
    SelectQueryRequest, SeriesConfig, ValueFormat,
};

//! Query-performance models.
//!
//! Metric series arrive from the platform as flat time-ordered points; the
//! insights service reshapes them into chart series.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Metric tab of the query insights dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    QueryLatency,
    RowsRead,
    Calls,
    CacheHits,
    Issues,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricType::QueryLatency => "query_latency",
            MetricType::RowsRead => "rows_read",
            MetricType::Calls => "calls",
            MetricType::CacheHits => "cache_hits",
            MetricType::Issues => "issues",
        };
        f.write_str(name)
    }
}

/// One server-reported metric point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct QueryInsightsMetric {
    /// ISO-like timestamp.
    pub timestamp: String,
    /// Primary value of the metric.
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99_9: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_blks_hit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_blks_read: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_blks_dirtied: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_blks_written: Option<f64>,
}

impl QueryInsightsMetric {
    /// Point carrying only a timestamp and a value.
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
            ..Default::default()
        }
    }
}

/// How a series value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Milliseconds rendered as μs, ms or s.
    Latency,
    /// Integer with thousands separators.
    Count,
    /// Percentage with one decimal.
    Percent,
}

/// Presentation of one chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeriesConfig {
    pub label: String,
    /// Hex colour.
    pub color: String,
    pub format: ValueFormat,
    /// Hidden series stay in the config so they can be toggled back.
    pub visible: bool,
}

/// One chart point: a timestamp plus named series values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub timestamp: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartPoint {
    /// Value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Chart-ready data for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartData {
    pub metric: MetricType,
    pub chart_data: Vec<ChartPoint>,
    pub config: BTreeMap<String, SeriesConfig>,
}

/// Summary of the selected query for the active metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricBadge {
    pub metric: MetricType,
    pub value: f64,
    /// `value` rendered with the metric's format.
    pub display: String,
}

/// Request body for chart and badge endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChartRequest {
    /// Metric to build.
    pub metric: MetricType,
    /// Metric tab currently shown; `None` means `metric` is active.
    #[serde(default)]
    pub active_metric: Option<MetricType>,
    /// Server-reported series.
    #[serde(default)]
    #[validate(length(max = 10000, message = "series must have at most 10000 points"))]
    pub series: Vec<QueryInsightsMetric>,
    /// Selected query's series; the stored selection is used when absent.
    #[serde(default)]
    #[validate(length(max = 10000, message = "overlay must have at most 10000 points"))]
    pub overlay: Option<Vec<QueryInsightsMetric>>,
    /// Series keys to mark hidden.
    #[serde(default)]
    pub hidden_series: Vec<String>,
}

impl ChartRequest {
    /// Whether `metric` is the active tab.
    pub fn is_active(&self) -> bool {
        self.active_metric.map_or(true, |active| active == self.metric)
    }
}

/// Request body for selecting a query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SelectQueryRequest {
    /// Identifier of the query (e.g. its `queryid`).
    #[validate(length(min = 1, max = 128, message = "query_id must be 1-128 characters"))]
    pub query_id: String,
    /// The query's own metric series.
    #[serde(default)]
    #[validate(length(max = 10000, message = "series must have at most 10000 points"))]
    pub series: Vec<QueryInsightsMetric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_deserializes_snake_case() {
        let metric: MetricType = serde_json::from_str("\"cache_hits\"").unwrap();
        assert_eq!(metric, MetricType::CacheHits);
        assert_eq!(MetricType::QueryLatency.to_string(), "query_latency");
    }

    #[test]
    fn test_chart_point_flattens_values() {
        let point = ChartPoint {
            timestamp: "2024-01-01T00:00:00Z".into(),
            values: BTreeMap::from([("rows".to_string(), 3.0)]),
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["rows"], 3.0);
        assert_eq!(value["timestamp"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_chart_request_active_flag() {
        let mut request: ChartRequest =
            serde_json::from_str(r#"{"metric":"calls"}"#).unwrap();
        assert!(request.is_active());
        request.active_metric = Some(MetricType::RowsRead);
        assert!(!request.is_active());
    }

    #[test]
    fn test_metric_point_missing_fields_default() {
        let point: QueryInsightsMetric =
            serde_json::from_str(r#"{"timestamp":"t"}"#).unwrap();
        assert_eq!(point.value, 0.0);
        assert!(point.p50.is_none());
    }
}

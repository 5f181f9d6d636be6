//! Chart adapter.
//!
//! Turns a flat metric series, plus the selected query's own series, into
//! chart points and a per-series presentation config. Empty input or an
//! inactive metric yields `None`; nothing here fails.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime, Utc};

use common::models::{ChartData, ChartPoint, MetricType, QueryInsightsMetric, SeriesConfig, ValueFormat};

/// Caller-side switches for [`build_chart_config`].
#[derive(Debug, Clone, Default)]
pub struct ChartOptions {
    /// Whether the metric's tab is the one shown.
    pub active: bool,
    /// Series keys rendered hidden.
    pub hidden_series: Vec<String>,
}

/// Presentation of one series key.
struct SeriesSpec {
    key: &'static str,
    label: &'static str,
    color: &'static str,
    format: ValueFormat,
}

const fn spec(key: &'static str, label: &'static str, color: &'static str, format: ValueFormat) -> SeriesSpec {
    SeriesSpec {
        key,
        label,
        color,
        format,
    }
}

const LATENCY_SERIES: &[SeriesSpec] = &[
    spec("p50", "P50", "#3ECF8E", ValueFormat::Latency),
    spec("p95", "P95", "#F5A623", ValueFormat::Latency),
    spec("p99", "P99", "#E5484D", ValueFormat::Latency),
    spec("p99_9", "P99.9", "#8E4EC6", ValueFormat::Latency),
];
const LATENCY_OVERLAY: &[SeriesSpec] = &[spec("query_latency", "Selected query", "#3B82F6", ValueFormat::Latency)];

const ROWS_SERIES: &[SeriesSpec] = &[spec("rows", "Rows read", "#3ECF8E", ValueFormat::Count)];
const ROWS_OVERLAY: &[SeriesSpec] = &[spec("query_rows", "Selected query", "#3B82F6", ValueFormat::Count)];

const CALLS_SERIES: &[SeriesSpec] = &[spec("calls", "Calls", "#3ECF8E", ValueFormat::Count)];
const CALLS_OVERLAY: &[SeriesSpec] = &[spec("query_calls", "Selected query", "#3B82F6", ValueFormat::Count)];

const CACHE_SERIES: &[SeriesSpec] = &[
    spec("cache_hit_ratio", "Cache hit ratio", "#3ECF8E", ValueFormat::Percent),
    spec("cache_miss_ratio", "Cache miss ratio", "#E5484D", ValueFormat::Percent),
    spec("shared_blks_hit", "Shared blocks hit", "#0EA5E9", ValueFormat::Count),
    spec("shared_blks_read", "Shared blocks read", "#F5A623", ValueFormat::Count),
    spec("shared_blks_dirtied", "Shared blocks dirtied", "#A1A1AA", ValueFormat::Count),
    spec("shared_blks_written", "Shared blocks written", "#8E4EC6", ValueFormat::Count),
];
const CACHE_OVERLAY: &[SeriesSpec] = &[spec(
    "query_cache_hit_ratio",
    "Selected query",
    "#3B82F6",
    ValueFormat::Percent,
)];

const ISSUES_SERIES: &[SeriesSpec] = &[spec("issues", "Issues", "#E5484D", ValueFormat::Count)];
const ISSUES_OVERLAY: &[SeriesSpec] = &[spec("query_issues", "Selected query", "#3B82F6", ValueFormat::Count)];

fn series_specs(metric: MetricType) -> (&'static [SeriesSpec], &'static [SeriesSpec]) {
    match metric {
        MetricType::QueryLatency => (LATENCY_SERIES, LATENCY_OVERLAY),
        MetricType::RowsRead => (ROWS_SERIES, ROWS_OVERLAY),
        MetricType::Calls => (CALLS_SERIES, CALLS_OVERLAY),
        MetricType::CacheHits => (CACHE_SERIES, CACHE_OVERLAY),
        MetricType::Issues => (ISSUES_SERIES, ISSUES_OVERLAY),
    }
}

/// Series key carrying the selected query's value for `metric`.
pub fn overlay_key(metric: MetricType) -> &'static str {
    series_specs(metric).1[0].key
}

/// Value format of `metric`'s selected-query series.
pub fn overlay_format(metric: MetricType) -> ValueFormat {
    series_specs(metric).1[0].format
}

/// Hit ratio in percent and its complement; both zero without any block access.
pub fn cache_ratios(hit: f64, read: f64) -> (f64, f64) {
    let hit = hit.max(0.0);
    let read = read.max(0.0);
    let total = hit + read;
    if total > 0.0 {
        let ratio = hit / total * 100.0;
        (ratio, 100.0 - ratio)
    } else {
        (0.0, 0.0)
    }
}

fn base_values(metric: MetricType, point: &QueryInsightsMetric) -> Vec<(&'static str, f64)> {
    let or_zero = |value: Option<f64>| value.unwrap_or(0.0);
    match metric {
        MetricType::QueryLatency => vec![
            ("p50", or_zero(point.p50)),
            ("p95", or_zero(point.p95)),
            ("p99", or_zero(point.p99)),
            ("p99_9", or_zero(point.p99_9)),
        ],
        MetricType::RowsRead => vec![("rows", point.value)],
        MetricType::Calls => vec![("calls", point.value)],
        MetricType::CacheHits => {
            let hit = or_zero(point.shared_blks_hit);
            let read = or_zero(point.shared_blks_read);
            let (hit_ratio, miss_ratio) = cache_ratios(hit, read);
            vec![
                ("cache_hit_ratio", hit_ratio),
                ("cache_miss_ratio", miss_ratio),
                ("shared_blks_hit", hit),
                ("shared_blks_read", read),
                ("shared_blks_dirtied", or_zero(point.shared_blks_dirtied)),
                ("shared_blks_written", or_zero(point.shared_blks_written)),
            ]
        }
        MetricType::Issues => vec![("issues", point.value)],
    }
}

fn overlay_values(metric: MetricType, point: &QueryInsightsMetric) -> Vec<(&'static str, f64)> {
    match metric {
        MetricType::CacheHits => {
            let hit = point.shared_blks_hit.unwrap_or(0.0);
            let read = point.shared_blks_read.unwrap_or(0.0);
            vec![
                ("query_cache_hit_ratio", cache_ratios(hit, read).0),
                ("query_shared_blks_hit", hit),
                ("query_shared_blks_read", read),
            ]
        }
        _ => vec![(overlay_key(metric), point.value)],
    }
}

/// Parses the timestamp shapes the platform emits; `None` sorts first.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Stable chronological sort.
fn sort_points(points: &mut [ChartPoint]) {
    points.sort_by_cached_key(|point| parse_timestamp(&point.timestamp));
}

fn point(timestamp: &str, values: impl IntoIterator<Item = (&'static str, f64)>) -> ChartPoint {
    ChartPoint {
        timestamp: timestamp.to_string(),
        values: values.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    }
}

/// Builds chart points and series config for `metric`.
///
/// Overlay points are merged into the base point with the same timestamp;
/// overlay-only timestamps become new points whose base series are zero.
pub fn build_chart_config(
    metric: MetricType,
    series: &[QueryInsightsMetric],
    overlay: Option<&[QueryInsightsMetric]>,
    options: &ChartOptions,
) -> Option<ChartData> {
    if series.is_empty() || !options.active {
        return None;
    }

    let mut chart_data: Vec<ChartPoint> = series
        .iter()
        .map(|p| point(&p.timestamp, base_values(metric, p)))
        .collect();
    sort_points(&mut chart_data);

    let overlay = overlay.filter(|points| !points.is_empty());
    if let Some(overlay) = overlay {
        let (base_specs, _) = series_specs(metric);
        // First point per timestamp, as a linear scan would find it.
        let mut index: HashMap<String, usize> = HashMap::with_capacity(chart_data.len());
        for (i, p) in chart_data.iter().enumerate() {
            index.entry(p.timestamp.clone()).or_insert(i);
        }
        for item in overlay {
            let values = overlay_values(metric, item);
            match index.get(item.timestamp.as_str()) {
                Some(&i) => chart_data[i]
                    .values
                    .extend(values.into_iter().map(|(k, v)| (k.to_string(), v))),
                None => {
                    index.insert(item.timestamp.clone(), chart_data.len());
                    chart_data.push(point(
                        &item.timestamp,
                        base_specs.iter().map(|s| (s.key, 0.0)).chain(values),
                    ));
                }
            }
        }
        sort_points(&mut chart_data);
    }

    let (base_specs, overlay_specs) = series_specs(metric);
    let shown = base_specs
        .iter()
        .chain(overlay.map_or(&[][..], |_| overlay_specs));
    let config = shown
        .map(|s| {
            (
                s.key.to_string(),
                SeriesConfig {
                    label: s.label.to_string(),
                    color: s.color.to_string(),
                    format: s.format,
                    visible: !options.hidden_series.iter().any(|h| h == s.key),
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    Some(ChartData {
        metric,
        chart_data,
        config,
    })
}

//! Metric badge for the selected query.

use common::models::{ChartData, MetricBadge, MetricType};

use crate::adapter::{cache_ratios, overlay_format, overlay_key};
use crate::format::format_value;

/// Aggregates the selected query's series in `chart`.
///
/// Latency is averaged, rows and calls are summed, the cache-hit ratio is
/// recomputed from the summed raw block counters and issues count the points
/// with a non-zero value. `None` when the chart carries no selected-query
/// values.
pub fn metric_badge(chart: &ChartData) -> Option<MetricBadge> {
    let metric = chart.metric;
    let key = overlay_key(metric);
    let values: Vec<f64> = chart.chart_data.iter().filter_map(|p| p.get(key)).collect();
    if values.is_empty() {
        return None;
    }

    let value = match metric {
        MetricType::QueryLatency => values.iter().sum::<f64>() / values.len() as f64,
        MetricType::RowsRead | MetricType::Calls => values.iter().sum(),
        MetricType::CacheHits => {
            let sum = |key: &str| chart.chart_data.iter().filter_map(|p| p.get(key)).sum::<f64>();
            cache_ratios(sum("query_shared_blks_hit"), sum("query_shared_blks_read")).0
        }
        MetricType::Issues => values.iter().filter(|v| **v > 0.0).count() as f64,
    };

    Some(MetricBadge {
        metric,
        value,
        display: format_value(overlay_format(metric), value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{build_chart_config, ChartOptions};
    use common::models::QueryInsightsMetric;

    fn chart(metric: MetricType, overlay: &[QueryInsightsMetric]) -> ChartData {
        let series: Vec<_> = overlay
            .iter()
            .map(|p| QueryInsightsMetric::new(p.timestamp.clone(), 1.0))
            .collect();
        let options = ChartOptions {
            active: true,
            hidden_series: Vec::new(),
        };
        build_chart_config(metric, &series, Some(overlay), &options).unwrap()
    }

    fn points(values: &[f64]) -> Vec<QueryInsightsMetric> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| QueryInsightsMetric::new(format!("2024-01-01T0{i}:00:00Z"), *v))
            .collect()
    }

    #[test]
    fn test_latency_is_averaged() {
        let badge = metric_badge(&chart(MetricType::QueryLatency, &points(&[2.0, 4.0]))).unwrap();
        assert_eq!(badge.value, 3.0);
        assert_eq!(badge.display, "3.00ms");
    }

    #[test]
    fn test_rows_and_calls_are_summed() {
        let badge = metric_badge(&chart(MetricType::RowsRead, &points(&[1000.0, 234.0]))).unwrap();
        assert_eq!(badge.value, 1234.0);
        assert_eq!(badge.display, "1,234");
        let badge = metric_badge(&chart(MetricType::Calls, &points(&[1.0, 2.0, 3.0]))).unwrap();
        assert_eq!(badge.value, 6.0);
    }

    #[test]
    fn test_issues_are_counted() {
        let badge = metric_badge(&chart(MetricType::Issues, &points(&[0.0, 2.0, 5.0]))).unwrap();
        assert_eq!(badge.value, 2.0);
    }

    #[test]
    fn test_cache_ratio_uses_raw_totals() {
        let overlay: Vec<_> = [(9.0, 1.0), (1.0, 9.0)]
            .iter()
            .enumerate()
            .map(|(i, (hit, read))| QueryInsightsMetric {
                shared_blks_hit: Some(*hit),
                shared_blks_read: Some(*read),
                ..QueryInsightsMetric::new(format!("2024-01-01T0{i}:00:00Z"), 0.0)
            })
            .collect();
        let badge = metric_badge(&chart(MetricType::CacheHits, &overlay)).unwrap();
        assert_eq!(badge.value, 50.0);
        assert_eq!(badge.display, "50.0%");
    }

    #[test]
    fn test_no_selected_query_values() {
        let options = ChartOptions {
            active: true,
            hidden_series: Vec::new(),
        };
        let data = build_chart_config(
            MetricType::Calls,
            &[QueryInsightsMetric::new("2024-01-01T00:00:00Z", 1.0)],
            None,
            &options,
        )
        .unwrap();
        assert!(metric_badge(&data).is_none());
    }
}

//! 查询性能图表服务模块

use std::sync::Arc;

use tracing::{debug, info};

use common::models::{ChartData, ChartRequest, MetricBadge, SelectQueryRequest};

use crate::adapter::{build_chart_config, ChartOptions};
use crate::badge::metric_badge;
use crate::selection::{QuerySelectionStore, SelectedQuery};

/// 图表适配与选中查询服务
#[derive(Clone, Default)]
pub struct InsightsService {
    store: Arc<QuerySelectionStore>,
}

impl InsightsService {
    /// 创建新的服务实例
    pub fn new(store: Arc<QuerySelectionStore>) -> Self {
        Self { store }
    }

    /// 选中查询存储
    pub fn store(&self) -> &QuerySelectionStore {
        &self.store
    }

    /// 生成图表数据；请求未携带叠加序列时使用已选中查询的序列
    pub async fn chart(&self, project_ref: &str, req: &ChartRequest) -> Option<ChartData> {
        let stored = match &req.overlay {
            Some(_) => None,
            None => self.store.get(project_ref).await,
        };
        let overlay = req
            .overlay
            .as_deref()
            .or_else(|| stored.as_ref().map(|q| q.series.as_slice()));

        let options = ChartOptions {
            active: req.is_active(),
            hidden_series: req.hidden_series.clone(),
        };
        let chart = build_chart_config(req.metric, &req.series, overlay, &options);
        debug!(
            project_ref,
            metric = %req.metric,
            points = chart.as_ref().map_or(0, |c| c.chart_data.len()),
            "图表数据已生成"
        );
        chart
    }

    /// 选中查询在当前指标下的汇总
    pub async fn badge(&self, project_ref: &str, req: &ChartRequest) -> Option<MetricBadge> {
        self.chart(project_ref, req)
            .await
            .and_then(|chart| metric_badge(&chart))
    }

    /// 设置项目的选中查询
    pub async fn select(&self, project_ref: &str, req: SelectQueryRequest) -> SelectedQuery {
        let query = SelectedQuery {
            query_id: req.query_id,
            series: req.series,
        };
        self.store.select(project_ref, query.clone()).await;
        info!(project_ref, query_id = %query.query_id, "已选中查询");
        query
    }

    /// 清除项目的选中查询，返回是否存在选中项
    pub async fn clear(&self, project_ref: &str) -> bool {
        self.store.clear(project_ref).await.is_some()
    }

    /// 当前选中查询
    pub async fn selection(&self, project_ref: &str) -> Option<SelectedQuery> {
        self.store.get(project_ref).await
    }
}

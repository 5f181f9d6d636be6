//! 连接串服务模块

use tracing::debug;

use common::models::{
    AnnotateSyntaxRequest, BuildConnectionStringsRequest, ConnectionStrings, Dialect, SyntaxToken,
};

use crate::builder::build_connection_strings;
use crate::syntax::annotate_syntax;

/// 连接串生成与标注服务
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionStringService;

impl ConnectionStringService {
    /// 创建新的服务实例
    pub fn new() -> Self {
        Self
    }

    /// 生成直连与连接池两组连接串
    pub fn build(&self, req: &BuildConnectionStringsRequest) -> ConnectionStrings {
        let strings =
            build_connection_strings(&req.connection_info, &req.pooling_info, &req.metadata);
        debug!(
            md5 = req.pooling_info.is_md5(),
            project_ref = req.metadata.project_ref.as_deref().unwrap_or_default(),
            "连接串已生成"
        );
        strings
    }

    /// 标注所选方言的连接串模板
    pub fn annotate(&self, req: &AnnotateSyntaxRequest) -> Vec<SyntaxToken> {
        let tokens = annotate_syntax(&req.connection_string, &req.options);
        if tokens.is_empty() {
            debug!(dialect = %req.options.selected_tab, "未知方言，返回空标注");
        }
        tokens
    }

    /// 支持的全部方言
    pub fn dialects(&self) -> Vec<Dialect> {
        Dialect::ALL.to_vec()
    }
}

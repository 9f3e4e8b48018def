// ==========================================
// 服务监控看板 - 核心库
// ==========================================
// 职责: 服务树状态聚合引擎 (检查结果 → 叶子 → 业务服务 → 根)
// 技术栈: Rust + SQLite (配置) + Tokio (轮询)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 聚合/传播/增量更新
pub mod engine;

// 配置层 - 系统配置与视图描述
pub mod config;

// 轮询层 - 检查源与周期驱动
pub mod monitor;

// 应用层 - 组装
pub mod app;

// 数据库基础设施 (连接初始化/PRAGMA 统一)
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AggregationRule, CheckResult, MonitorKind, NodeKind, NodeStatusView, PropagationRule,
    QosSnapshot, ServiceNode, ServiceTree, Severity, ThresholdRule, TreeError, Weight,
};

// 引擎
pub use engine::{PropagationEngine, QosEngine, StatusAggregator, TreeUpdater, UpdateReport};

// 配置
pub use config::{ConfigError, ConfigManager, EngineSettings, MonitorSettings, ViewConfig};

// 轮询
pub use monitor::{CheckSource, FileCheckSource, MonitorError, StaticCheckSource, StatusMonitor};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "服务监控看板";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

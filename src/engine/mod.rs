// ==========================================
// 服务监控看板 - 引擎层
// ==========================================
// 职责: 严重级别聚合、传播与服务树增量更新
// 红线: Engine 不访问存储,不发起网络请求
// ==========================================

pub mod aggregator;
pub mod events;
pub mod propagation;
pub mod qos;
pub mod severity_mapping;
pub mod tree_updater;

// 重导出核心引擎
pub use aggregator::StatusAggregator;
pub use events::{
    CollectingEventPublisher, NoOpEventPublisher, OptionalEventPublisher, StatusEvent,
    StatusEventPublisher, StatusEventType,
};
pub use propagation::PropagationEngine;
pub use qos::QosEngine;
pub use severity_mapping::zabbix_calc_rule;
pub use tree_updater::{overall_severity, TreeUpdater, UpdateReport};

// ==========================================
// 服务监控看板 - 领域模型层
// ==========================================
// 职责: 定义严重级别、规则、节点、服务树等领域实体
// 红线: 不含计算逻辑,不含存储逻辑
// ==========================================

pub mod check;
pub mod error;
pub mod node;
pub mod qos;
pub mod threshold;
pub mod tree;
pub mod types;
pub mod weight;

// 重导出核心类型
pub use check::{CheckResult, NodeStatusView};
pub use error::{TreeError, TreeResult};
pub use node::{ServiceNode, UpdateState};
pub use qos::QosSnapshot;
pub use threshold::ThresholdRule;
pub use tree::ServiceTree;
pub use types::{AggregationRule, MonitorKind, NodeKind, PropagationRule, Severity};
pub use weight::Weight;

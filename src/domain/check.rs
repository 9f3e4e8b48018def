// ==========================================
// 服务监控看板 - 检查结果与节点状态视图
// ==========================================
// 输入: 轮询方推送的检查结果 (严重级别已归一化为整数)
// 输出: 每轮更新后供展示层读取的节点状态
// ==========================================

use crate::domain::types::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CheckResult - 检查结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub node_id: String,           // 目标节点ID
    pub severity: i32,             // 严重级别原始值 (越界视为 Unknown)
    pub timestamp: DateTime<Utc>,  // 状态变化时间
    #[serde(default)]
    pub message: String,           // 告警/输出信息
}

impl CheckResult {
    pub fn new(node_id: &str, severity: i32, message: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            severity,
            timestamp: Utc::now(),
            message: message.to_string(),
        }
    }

    /// 归一化后的严重级别
    pub fn severity(&self) -> Severity {
        if !Severity::is_valid(self.severity) {
            tracing::debug!(
                "检查结果严重级别越界,按 UNKNOWN 处理: node_id={}, raw={}",
                self.node_id,
                self.severity
            );
        }
        Severity::from_raw(self.severity)
    }
}

// ==========================================
// NodeStatusView - 节点状态视图 (只读)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatusView {
    pub node_id: String,
    pub name: String,
    pub aggregated_severity: Severity, // 本节点聚合结果
    pub reported_severity: Severity,   // 传播给父节点的结果
    pub diagnostic: Option<String>,    // 阈值命中说明 / 检查输出
}

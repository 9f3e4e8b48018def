// ==========================================
// 服务监控看板 - 状态传播引擎
// ==========================================
// 职责: 节点聚合级别 → 上报给父节点的级别
// 规则: Unchanged 原样 / Increased 升一级 / Decreased 降一级 (均饱和)
// ==========================================

use crate::domain::types::{PropagationRule, Severity};

// ==========================================
// PropagationEngine - 状态传播引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagationEngine;

impl PropagationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 按传播规则变换严重级别
    pub fn propagate(&self, severity: Severity, rule: PropagationRule) -> Severity {
        match rule {
            PropagationRule::Unchanged => severity,
            PropagationRule::Increased => severity.increment(),
            PropagationRule::Decreased => severity.decrement(),
        }
    }
}

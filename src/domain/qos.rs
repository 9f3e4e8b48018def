// ==========================================
// 服务监控看板 - QoS 快照领域模型
// ==========================================
// 用途: 视图级服务质量采样 (根节点状态 + 叶子检查项级别分布)
// ==========================================

use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};

// ==========================================
// QosSnapshot - QoS 快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QosSnapshot {
    pub timestamp: i64,      // 采样时间 (Unix 秒)
    pub view_name: String,   // 视图名称
    pub status: Severity,    // 根节点上报级别

    // ===== 叶子检查项占比 (%) =====
    pub normal: f32,
    pub minor: f32,
    pub major: f32,
    pub critical: f32,
    pub unknown: f32,
}

impl QosSnapshot {
    /// 某级别的占比 (%)
    pub fn percent_of(&self, severity: Severity) -> f32 {
        match severity {
            Severity::Normal => self.normal,
            Severity::Minor => self.minor,
            Severity::Major => self.major,
            Severity::Critical => self.critical,
            Severity::Unknown => self.unknown,
        }
    }
}

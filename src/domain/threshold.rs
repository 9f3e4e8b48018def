// ==========================================
// 服务监控看板 - 阈值升级规则
// ==========================================
// 规则: sev_in 的加权占比 >= ratio 时,节点至少为 sev_out
// 评估顺序: 按 (sev_out, sev_in, ratio) 升序排列,从末尾向前评估,首个命中生效
// ==========================================

use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 阈值规则
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub sev_in: Severity,  // 被统计的严重级别
    pub ratio: f64,        // 占比阈值 [0, 1]
    pub sev_out: Severity, // 命中后的严重级别
}

impl ThresholdRule {
    pub fn new(sev_in: Severity, ratio: f64, sev_out: Severity) -> Self {
        Self {
            sev_in,
            ratio,
            sev_out,
        }
    }

    /// 占比阈值是否在 [0, 1] 内
    pub fn is_ratio_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.ratio)
    }

    /// 评估顺序 (全序)
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.sev_out
            .cmp(&other.sev_out)
            .then(self.sev_in.cmp(&other.sev_in))
            .then(self.ratio.total_cmp(&other.ratio))
    }
}

/// 按评估顺序排序
pub fn sort_rules(rules: &mut [ThresholdRule]) {
    rules.sort_by(|a, b| a.priority_cmp(b));
}

// ==========================================
// 服务监控看板 - 监控后端级别映射
// ==========================================
// 职责: 后端原生状态码 → 统一严重级别
// 红线: 未知状态码一律映射为 Unknown,不报错
// ==========================================

use crate::domain::types::{AggregationRule, MonitorKind, Severity};
use crate::domain::weight::Weight;

impl MonitorKind {
    /// 后端原生状态码 → 严重级别
    ///
    /// # 参数
    /// - `raw`: Nagios 服务状态 / Zabbix 触发器优先级 / Zenoss 事件级别
    pub fn to_severity(&self, raw: i32) -> Severity {
        match self {
            // OK / WARNING / CRITICAL / UNKNOWN
            MonitorKind::Nagios => match raw {
                0 => Severity::Normal,
                1 => Severity::Major,
                2 => Severity::Critical,
                _ => Severity::Unknown,
            },
            // 未分类 / 信息 / 警告 / 一般 / 严重 / 灾难
            MonitorKind::Zabbix => match raw {
                0 | 1 => Severity::Normal,
                2 => Severity::Minor,
                3 => Severity::Major,
                4 | 5 => Severity::Critical,
                _ => Severity::Unknown,
            },
            // clear / debug / info / warning / error / critical
            MonitorKind::Zenoss => match raw {
                0..=2 => Severity::Normal,
                3 => Severity::Minor,
                4 => Severity::Major,
                5 => Severity::Critical,
                _ => Severity::Unknown,
            },
        }
    }
}

/// Zabbix IT 服务计算算法 → (聚合规则, 边权重)
///
/// - 0: 不计算 (权重为 0,不影响父节点)
/// - 1: 任一子节点异常即异常
/// - 2: 全部子节点异常才异常 (按加权平均近似)
pub fn zabbix_calc_rule(algorithm: i32) -> (AggregationRule, Weight) {
    match algorithm {
        0 => (AggregationRule::Worst, Weight::ZERO),
        1 => (AggregationRule::Worst, Weight::UNIT),
        2 => (AggregationRule::WeightedAverage, Weight::UNIT),
        other => {
            tracing::debug!("未知的 Zabbix 计算算法,按 Worst 处理: algorithm={}", other);
            (AggregationRule::Worst, Weight::UNIT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nagios_mapping() {
        let kind = MonitorKind::Nagios;
        assert_eq!(kind.to_severity(0), Severity::Normal);
        assert_eq!(kind.to_severity(1), Severity::Major);
        assert_eq!(kind.to_severity(2), Severity::Critical);
        assert_eq!(kind.to_severity(3), Severity::Unknown);
        assert_eq!(kind.to_severity(-1), Severity::Unknown);
    }

    #[test]
    fn test_zabbix_calc_rule() {
        assert_eq!(zabbix_calc_rule(0), (AggregationRule::Worst, Weight::ZERO));
        assert_eq!(zabbix_calc_rule(2), (AggregationRule::WeightedAverage, Weight::UNIT));
        assert_eq!(zabbix_calc_rule(7), (AggregationRule::Worst, Weight::UNIT));
    }
}

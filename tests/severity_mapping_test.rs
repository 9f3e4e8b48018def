// ==========================================
// 监控后端级别映射集成测试
// ==========================================
// 测试目标: 验证 Nagios / Zabbix / Zenoss 状态码映射表
// ==========================================

use svc_status::domain::{AggregationRule, MonitorKind, Severity, Weight};
use svc_status::engine::zabbix_calc_rule;

fn mapped(kind: MonitorKind, codes: std::ops::RangeInclusive<i32>) -> Vec<Severity> {
    codes.map(|code| kind.to_severity(code)).collect()
}

#[test]
fn test_nagios_table() {
    assert_eq!(
        mapped(MonitorKind::Nagios, -1..=4),
        vec![
            Severity::Unknown,
            Severity::Normal,
            Severity::Major,
            Severity::Critical,
            Severity::Unknown,
            Severity::Unknown,
        ]
    );
}

#[test]
fn test_zabbix_table() {
    assert_eq!(
        mapped(MonitorKind::Zabbix, 0..=6),
        vec![
            Severity::Normal,
            Severity::Normal,
            Severity::Minor,
            Severity::Major,
            Severity::Critical,
            Severity::Critical,
            Severity::Unknown,
        ]
    );
}

#[test]
fn test_zenoss_table() {
    assert_eq!(
        mapped(MonitorKind::Zenoss, 0..=6),
        vec![
            Severity::Normal,
            Severity::Normal,
            Severity::Normal,
            Severity::Minor,
            Severity::Major,
            Severity::Critical,
            Severity::Unknown,
        ]
    );
}

#[test]
fn test_monitor_kind_parsing() {
    assert_eq!("nagios".parse::<MonitorKind>().unwrap(), MonitorKind::Nagios);
    assert_eq!(" Zabbix ".parse::<MonitorKind>().unwrap(), MonitorKind::Zabbix);
    assert!("icinga".parse::<MonitorKind>().is_err());
}

#[test]
fn test_zabbix_algorithms() {
    assert_eq!(zabbix_calc_rule(0), (AggregationRule::Worst, Weight::ZERO));
    assert_eq!(zabbix_calc_rule(1), (AggregationRule::Worst, Weight::UNIT));
    assert_eq!(
        zabbix_calc_rule(2),
        (AggregationRule::WeightedAverage, Weight::UNIT)
    );
    assert_eq!(zabbix_calc_rule(-5), (AggregationRule::Worst, Weight::UNIT));
}

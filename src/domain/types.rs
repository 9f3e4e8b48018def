// ==========================================
// 服务监控看板 - 领域类型定义
// ==========================================
// 严重级别 / 聚合规则 / 传播规则 / 节点类型 / 监控后端
// 红线: 严重级别是"等级制",所有输入先归一化再参与计算
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 严重级别 (Severity)
// ==========================================
// 顺序: Normal < Minor < Major < Critical < Unknown
// Unknown 不在升降级链上,聚合时按最差处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Severity {
    Normal = 0,   // 正常
    Minor = 1,    // 次要
    Major = 2,    // 主要
    Critical = 3, // 严重
    Unknown = 4,  // 未知
}

impl Severity {
    /// 全部级别,按原始值升序
    pub const ALL: [Severity; 5] = [
        Severity::Normal,
        Severity::Minor,
        Severity::Major,
        Severity::Critical,
        Severity::Unknown,
    ];

    /// 级别数量 (用于定长数组)
    pub const COUNT: usize = 5;

    /// 原始值是否属于定义域
    pub fn is_valid(raw: i32) -> bool {
        (0..=4).contains(&raw)
    }

    /// 从原始整数构造,越界值归一化为 Unknown
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Severity::Normal,
            1 => Severity::Minor,
            2 => Severity::Major,
            3 => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    /// 原始整数值
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// 定长数组下标
    pub fn index(self) -> usize {
        self as usize
    }

    /// 升一级 (Critical 饱和, Unknown 不变)
    pub fn increment(self) -> Self {
        match self {
            Severity::Normal => Severity::Minor,
            Severity::Minor => Severity::Major,
            Severity::Major | Severity::Critical => Severity::Critical,
            Severity::Unknown => Severity::Unknown,
        }
    }

    /// 降一级 (Normal 饱和, Unknown 不变)
    pub fn decrement(self) -> Self {
        match self {
            Severity::Normal | Severity::Minor => Severity::Normal,
            Severity::Major => Severity::Minor,
            Severity::Critical => Severity::Major,
            Severity::Unknown => Severity::Unknown,
        }
    }

    /// 转换为存储/配置用字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Minor => "MINOR",
            Severity::Major => "MAJOR",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// 本地化显示名称
    pub fn label(&self) -> String {
        let key = match self {
            Severity::Normal => "severity.normal",
            Severity::Minor => "severity.minor",
            Severity::Major => "severity.major",
            Severity::Critical => "severity.critical",
            Severity::Unknown => "severity.unknown",
        };
        crate::i18n::t(key)
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Normal
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NORMAL" => Ok(Severity::Normal),
            "MINOR" => Ok(Severity::Minor),
            "MAJOR" => Ok(Severity::Major),
            "CRITICAL" => Ok(Severity::Critical),
            "UNKNOWN" => Ok(Severity::Unknown),
            other => Err(format!("无效的严重级别: {}", other)),
        }
    }
}

// ==========================================
// 聚合规则 (Aggregation Rule)
// ==========================================
// 子节点严重级别 → 本节点严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationRule {
    Worst,             // 取最差
    WeightedAverage,   // 加权平均
    ThresholdWeighted, // 加权平均 + 阈值升级
}

impl AggregationRule {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AggregationRule::Worst => "WORST",
            AggregationRule::WeightedAverage => "WEIGHTED_AVERAGE",
            AggregationRule::ThresholdWeighted => "THRESHOLD_WEIGHTED",
        }
    }

    /// 本地化显示名称
    pub fn label(&self) -> String {
        let key = match self {
            AggregationRule::Worst => "calc_rule.worst",
            AggregationRule::WeightedAverage => "calc_rule.weighted_average",
            AggregationRule::ThresholdWeighted => "calc_rule.threshold_weighted",
        };
        crate::i18n::t(key)
    }
}

impl Default for AggregationRule {
    fn default() -> Self {
        AggregationRule::Worst
    }
}

impl fmt::Display for AggregationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for AggregationRule {
    type Err = String;

    /// 兼容旧配置中的别名 (HIGH_CRITICITY / AVERAGE / WEIGHTED)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WORST" | "HIGH_CRITICITY" => Ok(AggregationRule::Worst),
            "WEIGHTED_AVERAGE" | "AVERAGE" => Ok(AggregationRule::WeightedAverage),
            "THRESHOLD_WEIGHTED" | "WEIGHTED" => Ok(AggregationRule::ThresholdWeighted),
            other => Err(format!("无效的聚合规则: {}", other)),
        }
    }
}

// ==========================================
// 传播规则 (Propagation Rule)
// ==========================================
// 本节点严重级别 → 上报给父节点的严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropagationRule {
    Unchanged, // 原样上报
    Increased, // 升一级上报
    Decreased, // 降一级上报
}

impl PropagationRule {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PropagationRule::Unchanged => "UNCHANGED",
            PropagationRule::Increased => "INCREASED",
            PropagationRule::Decreased => "DECREASED",
        }
    }

    /// 本地化显示名称
    pub fn label(&self) -> String {
        let key = match self {
            PropagationRule::Unchanged => "prop_rule.unchanged",
            PropagationRule::Increased => "prop_rule.increased",
            PropagationRule::Decreased => "prop_rule.decreased",
        };
        crate::i18n::t(key)
    }
}

impl Default for PropagationRule {
    fn default() -> Self {
        PropagationRule::Unchanged
    }
}

impl fmt::Display for PropagationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for PropagationRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UNCHANGED" => Ok(PropagationRule::Unchanged),
            "INCREASED" => Ok(PropagationRule::Increased),
            "DECREASED" => Ok(PropagationRule::Decreased),
            other => Err(format!("无效的传播规则: {}", other)),
        }
    }
}

// ==========================================
// 节点类型 (Node Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    BusinessService, // 业务服务 (由子节点聚合)
    ItService,       // IT 服务 (绑定监控检查项)
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::BusinessService => write!(f, "BUSINESS_SERVICE"),
            NodeKind::ItService => write!(f, "IT_SERVICE"),
        }
    }
}

// ==========================================
// 监控后端 (Monitor Kind)
// ==========================================
// 映射表见 engine::severity_mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorKind {
    Nagios,
    Zabbix,
    Zenoss,
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorKind::Nagios => write!(f, "NAGIOS"),
            MonitorKind::Zabbix => write!(f, "ZABBIX"),
            MonitorKind::Zenoss => write!(f, "ZENOSS"),
        }
    }
}

impl FromStr for MonitorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NAGIOS" => Ok(MonitorKind::Nagios),
            "ZABBIX" => Ok(MonitorKind::Zabbix),
            "ZENOSS" => Ok(MonitorKind::Zenoss),
            other => Err(format!("无效的监控后端: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Normal < Severity::Minor);
        assert!(Severity::Minor < Severity::Major);
        assert!(Severity::Major < Severity::Critical);
        assert!(Severity::Critical < Severity::Unknown);
    }

    #[test]
    fn test_severity_from_raw_coerces_invalid() {
        assert!(Severity::is_valid(0));
        assert!(Severity::is_valid(4));
        assert!(!Severity::is_valid(-1));
        assert!(!Severity::is_valid(5));

        assert_eq!(Severity::from_raw(2), Severity::Major);
        assert_eq!(Severity::from_raw(-1), Severity::Unknown);
        assert_eq!(Severity::from_raw(42), Severity::Unknown);
    }

    #[test]
    fn test_severity_increment_saturates() {
        assert_eq!(Severity::Normal.increment(), Severity::Minor);
        assert_eq!(Severity::Major.increment(), Severity::Critical);
        assert_eq!(Severity::Critical.increment(), Severity::Critical);
        assert_eq!(Severity::Unknown.increment(), Severity::Unknown);
    }

    #[test]
    fn test_severity_decrement_saturates() {
        assert_eq!(Severity::Critical.decrement(), Severity::Major);
        assert_eq!(Severity::Minor.decrement(), Severity::Normal);
        assert_eq!(Severity::Normal.decrement(), Severity::Normal);
        assert_eq!(Severity::Unknown.decrement(), Severity::Unknown);
    }

    #[test]
    fn test_rule_parsing_with_aliases() {
        assert_eq!("worst".parse::<AggregationRule>(), Ok(AggregationRule::Worst));
        assert_eq!("AVERAGE".parse::<AggregationRule>(), Ok(AggregationRule::WeightedAverage));
        assert_eq!("Weighted".parse::<AggregationRule>(), Ok(AggregationRule::ThresholdWeighted));
        assert!("median".parse::<AggregationRule>().is_err());

        assert_eq!("increased".parse::<PropagationRule>(), Ok(PropagationRule::Increased));
        assert!("sideways".parse::<PropagationRule>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&AggregationRule::ThresholdWeighted).unwrap();
        assert_eq!(json, "\"THRESHOLD_WEIGHTED\"");

        let sev: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(sev, Severity::Critical);
    }
}

// ==========================================
// 服务监控看板 - 状态聚合引擎
// ==========================================
// 职责: 累积某个父节点的子节点 (严重级别, 权重),按聚合规则得出节点级别
// 输入: add_severity 逐条喂入子节点结果
// 输出: aggregate 返回聚合级别 + 阈值命中说明
// ==========================================
// 红线: 每个节点每轮计算前必须 reset (由调用方保证)
// 红线: 阈值只能升级,不能压低加权平均结果
// ==========================================

use crate::domain::threshold::{sort_rules, ThresholdRule};
use crate::domain::types::{AggregationRule, Severity};
use crate::domain::weight::Weight;

// ==========================================
// StatusAggregator - 状态聚合器
// ==========================================
#[derive(Debug, Clone)]
pub struct StatusAggregator {
    // ===== 非关键子项 =====
    weights: [f64; Severity::COUNT], // 各级别累计权重
    ratios: [f64; Severity::COUNT],  // 各级别权重占比 (总权重为 0 时为 +∞)
    non_essential_total: f64,
    weight_scale: f64, // 累计权重的缩放系数 (溢出时减半)

    // ===== 计数与边界 =====
    count: usize,
    essential_count: usize,
    max_essential: Severity,
    min_severity: Option<Severity>,
    max_severity: Severity,

    // ===== 阈值规则 (按评估顺序) =====
    thresholds: Vec<ThresholdRule>,

    last_exceeded_message: Option<String>,
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusAggregator {
    /// 创建空聚合器
    pub fn new() -> Self {
        Self {
            weights: [0.0; Severity::COUNT],
            ratios: [f64::INFINITY; Severity::COUNT],
            non_essential_total: 0.0,
            weight_scale: 1.0,
            count: 0,
            essential_count: 0,
            max_essential: Severity::Normal,
            min_severity: None,
            max_severity: Severity::Normal,
            thresholds: Vec::new(),
            last_exceeded_message: None,
        }
    }

    /// 带初始阈值规则创建
    pub fn with_thresholds(rules: &[ThresholdRule]) -> Self {
        let mut aggregator = Self::new();
        for rule in rules {
            aggregator.add_threshold_rule(*rule);
        }
        aggregator
    }

    // ==========================================
    // 累积
    // ==========================================

    /// 清空全部累积数据 (含阈值规则)
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 喂入一个子节点结果
    ///
    /// # 规则
    /// - 权重为 0: 只计数,不影响占比与边界
    /// - 关键权重: 只抬高关键下限,不进入占比
    /// - 其他: 累加到对应级别的权重
    pub fn add_severity(&mut self, value: Severity, weight: Weight) {
        if !weight.is_excluded() {
            self.min_severity = Some(match self.min_severity {
                Some(current) => current.min(value),
                None => value,
            });
            self.max_severity = self.max_severity.max(value);

            if weight.is_essential() {
                self.essential_count += 1;
                self.max_essential = self.max_essential.max(value);
            } else {
                self.accumulate(value, weight.value());
            }
        }

        self.update_ratios();
        self.count += 1;
    }

    /// 喂入原始整数级别 (越界归一化为 Unknown)
    pub fn add_raw_severity(&mut self, raw: i32, weight: Weight) {
        if !Severity::is_valid(raw) {
            tracing::debug!("严重级别越界,按 UNKNOWN 处理: raw={}", raw);
        }
        self.add_severity(Severity::from_raw(raw), weight);
    }

    /// 添加阈值规则并保持评估顺序
    pub fn add_threshold_rule(&mut self, rule: ThresholdRule) {
        self.thresholds.push(rule);
        sort_rules(&mut self.thresholds);
    }

    /// 累加非关键权重,和溢出时整体减半 (占比不变)
    fn accumulate(&mut self, value: Severity, weight: f64) {
        let mut weight = weight * self.weight_scale;
        while !(self.weights[value.index()] + weight).is_finite()
            || !(self.non_essential_total + weight).is_finite()
        {
            for w in self.weights.iter_mut() {
                *w /= 2.0;
            }
            self.non_essential_total /= 2.0;
            self.weight_scale /= 2.0;
            weight /= 2.0;
        }
        self.weights[value.index()] += weight;
        self.non_essential_total += weight;
    }

    fn update_ratios(&mut self) {
        if self.non_essential_total > 0.0 {
            for sev in Severity::ALL {
                self.ratios[sev.index()] = self.weights[sev.index()] / self.non_essential_total;
            }
        } else {
            self.ratios = [f64::INFINITY; Severity::COUNT];
        }
    }

    // ==========================================
    // 聚合
    // ==========================================

    /// 按规则聚合
    ///
    /// # 规则
    /// - 无任何子项: Normal
    /// - Worst: 非零权重子项中的最差级别
    /// - WeightedAverage: 加权平均取整,不低于关键下限
    /// - ThresholdWeighted: max(命中阈值的输出级别, 加权平均)
    pub fn aggregate(&mut self, rule: AggregationRule) -> Severity {
        self.last_exceeded_message = None;

        if self.count == 0 {
            tracing::debug!("聚合集合为空,按 NORMAL 处理");
            return Severity::Normal;
        }

        match rule {
            AggregationRule::Worst => self.max_severity,
            AggregationRule::WeightedAverage => self.weighted_average(),
            AggregationRule::ThresholdWeighted => {
                let average = self.weighted_average();
                match self.evaluate_thresholds() {
                    Some((rule, message)) => {
                        tracing::debug!("{}", message);
                        self.last_exceeded_message = Some(message);
                        rule.sev_out.max(average)
                    }
                    None => average,
                }
            }
        }
    }

    /// 加权平均 (关键下限兜底)
    ///
    /// 基于归一化占比计算,极大权重不会溢出
    fn weighted_average(&self) -> Severity {
        let average = if self.non_essential_total > 0.0 {
            let mean: f64 = Severity::ALL
                .iter()
                .map(|sev| self.ratios[sev.index()] * sev.as_raw() as f64)
                .sum();
            Severity::from_raw(mean.round() as i32)
        } else {
            Severity::Normal
        };

        average.max(self.max_essential)
    }

    /// 从最高优先级开始评估,首个命中生效
    ///
    /// 占比为 +∞ (尚无非关键权重) 时不命中任何阈值
    fn evaluate_thresholds(&self) -> Option<(ThresholdRule, String)> {
        self.thresholds.iter().rev().find_map(|rule| {
            let ratio = self.ratios[rule.sev_in.index()];
            if ratio.is_finite() && ratio >= rule.ratio {
                let message = crate::i18n::t_with_args(
                    "aggregator.threshold_exceeded",
                    &[
                        ("sev_in", rule.sev_in.label().as_str()),
                        ("pct", format_percent(rule.ratio).as_str()),
                        ("sev_out", rule.sev_out.label().as_str()),
                    ],
                );
                Some((*rule, message))
            } else {
                None
            }
        })
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn essential_count(&self) -> usize {
        self.essential_count
    }

    pub fn max_essential_severity(&self) -> Severity {
        self.max_essential
    }

    pub fn min_severity(&self) -> Option<Severity> {
        self.min_severity
    }

    pub fn max_severity(&self) -> Severity {
        self.max_severity
    }

    /// 某级别的权重占比 (+∞ 表示尚无非关键权重)
    pub fn ratio(&self, severity: Severity) -> f64 {
        self.ratios[severity.index()]
    }

    pub fn thresholds(&self) -> &[ThresholdRule] {
        &self.thresholds
    }

    /// 最近一次阈值命中说明
    pub fn last_exceeded_message(&self) -> Option<&str> {
        self.last_exceeded_message.as_deref()
    }

    /// 各级别占比摘要
    pub fn ratio_summary(&self) -> String {
        let pct = |sev: Severity| {
            let ratio = self.ratios[sev.index()];
            if ratio.is_finite() {
                format_percent(ratio)
            } else {
                "-".to_string()
            }
        };
        crate::i18n::t_with_args(
            "aggregator.ratio_summary",
            &[
                ("unknown", pct(Severity::Unknown).as_str()),
                ("critical", pct(Severity::Critical).as_str()),
                ("major", pct(Severity::Major).as_str()),
                ("minor", pct(Severity::Minor).as_str()),
                ("normal", pct(Severity::Normal).as_str()),
            ],
        )
    }
}

/// 比例 → 百分比文本 (最多两位小数)
fn format_percent(ratio: f64) -> String {
    let pct = (ratio * 100.0 * 100.0).round() / 100.0;
    format!("{}", pct)
}

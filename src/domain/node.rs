// ==========================================
// 服务监控看板 - 服务节点
// ==========================================
// 节点 = 配置 (规则/阈值/权重) + 运行态 (聚合结果/上报结果/更新状态)
// 红线: 引擎只写运行态,不改变节点身份与拓扑
// ==========================================

use crate::domain::check::{CheckResult, NodeStatusView};
use crate::domain::threshold::ThresholdRule;
use crate::domain::types::{AggregationRule, NodeKind, PropagationRule, Severity};
use crate::domain::weight::Weight;
use serde::{Deserialize, Serialize};

// ==========================================
// 更新状态 (Update State)
// ==========================================
// Stale: 子节点有变化,待重算
// Computing: 重算中
// Settled: 本轮已稳定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateState {
    Stale,
    Computing,
    Settled,
}

// ==========================================
// ServiceNode - 服务节点
// ==========================================
#[derive(Debug, Clone)]
pub struct ServiceNode {
    // ===== 身份 =====
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: NodeKind,

    // ===== 计算配置 =====
    pub aggregation_rule: AggregationRule,
    pub propagation_rule: PropagationRule,
    pub thresholds: Vec<ThresholdRule>,
    pub weight: Weight, // 本节点对父节点的权重

    // ===== 拓扑 (由 ServiceTree 维护) =====
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,

    // ===== 运行态 =====
    pub aggregated_severity: Severity,
    pub reported_severity: Severity,
    pub diagnostic: Option<String>,
    pub last_check: Option<CheckResult>,
    pub update_state: UpdateState,
}

impl ServiceNode {
    /// 创建业务服务节点 (初始为 Stale,首轮更新时计算)
    pub fn business(id: &str, name: &str, aggregation_rule: AggregationRule) -> Self {
        let mut node = Self::with_kind(
            id,
            name,
            NodeKind::BusinessService,
            aggregation_rule,
            Severity::Normal,
        );
        node.update_state = UpdateState::Stale;
        node
    }

    /// 创建 IT 服务节点 (叶子,等待检查结果,初始为 Unknown)
    pub fn it_service(id: &str, name: &str) -> Self {
        Self::with_kind(id, name, NodeKind::ItService, AggregationRule::Worst, Severity::Unknown)
    }

    fn with_kind(
        id: &str,
        name: &str,
        kind: NodeKind,
        aggregation_rule: AggregationRule,
        initial: Severity,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            kind,
            aggregation_rule,
            propagation_rule: PropagationRule::Unchanged,
            thresholds: Vec::new(),
            weight: Weight::UNIT,
            parent: None,
            children: Vec::new(),
            aggregated_severity: initial,
            reported_severity: initial,
            diagnostic: None,
            last_check: None,
            update_state: UpdateState::Settled,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_propagation(mut self, rule: PropagationRule) -> Self {
        self.propagation_rule = rule;
        self
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<ThresholdRule>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// 是否叶子节点 (没有子节点)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 只读状态视图
    pub fn status_view(&self) -> NodeStatusView {
        NodeStatusView {
            node_id: self.id.clone(),
            name: self.name.clone(),
            aggregated_severity: self.aggregated_severity,
            reported_severity: self.reported_severity,
            diagnostic: self.diagnostic.clone(),
        }
    }
}

// ==========================================
// 服务监控看板 - 视图配置
// ==========================================
// 职责: JSON 视图描述 → ServiceTree
// 红线: 非法配置在建树前报错,不进入引擎
// ==========================================
// 格式:
// { "name": "...", "nodes": [ { "id", "name", "description"?, "parent"?,
//   "aggregation_rule"?, "propagation_rule"?, "weight"?, "essential"?,
//   "zabbix_algorithm"?, "thresholds"? } ] }
// 被其他节点引用为 parent 的节点是业务服务,其余为 IT 服务 (叶子)
// ==========================================

use crate::config::config_manager::EngineSettings;
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::node::ServiceNode;
use crate::domain::threshold::ThresholdRule;
use crate::domain::tree::ServiceTree;
use crate::domain::types::{AggregationRule, PropagationRule};
use crate::domain::weight::Weight;
use crate::engine::severity_mapping::zabbix_calc_rule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 视图描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub name: String,
    pub nodes: Vec<NodeConfig>,
}

/// 节点描述
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub aggregation_rule: Option<AggregationRule>,
    #[serde(default)]
    pub propagation_rule: Option<PropagationRule>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub essential: bool,
    #[serde(default)]
    pub zabbix_algorithm: Option<i32>,
    #[serde(default)]
    pub thresholds: Option<Vec<ThresholdRule>>,
}

impl ViewConfig {
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 从文件读取视图描述
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let view = Self::from_json_str(&raw)?;
        tracing::info!(
            "视图配置已加载: path={}, name={}, nodes={}",
            path.as_ref().display(),
            view.name,
            view.nodes.len()
        );
        Ok(view)
    }

    /// 校验并构建服务树
    ///
    /// # 参数
    /// - `settings`: 节点未指定规则/阈值时使用的默认值
    ///
    /// # 错误
    /// - 父节点不存在 / 占比阈值超出 [0, 1] / 权重为负: InvalidView
    /// - 节点ID重复 / 形成环: Tree
    pub fn build_tree(&self, settings: &EngineSettings) -> ConfigResult<ServiceTree> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let parents: HashSet<&str> = self
            .nodes
            .iter()
            .filter_map(|n| n.parent.as_deref())
            .collect();

        for node in &self.nodes {
            if node.id.trim().is_empty() {
                return Err(ConfigError::invalid_view(&node.id, "节点ID为空"));
            }
            if let Some(parent) = node.parent.as_deref() {
                if !ids.contains(parent) {
                    return Err(ConfigError::invalid_view(
                        &node.id,
                        format!("父节点不存在: {}", parent),
                    ));
                }
            }
            if let Some(weight) = node.weight {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(ConfigError::invalid_view(
                        &node.id,
                        format!("权重必须为非负有限值: {}", weight),
                    ));
                }
            }
            if let Some(rule) = node
                .thresholds
                .iter()
                .flatten()
                .find(|r| !r.is_ratio_valid())
            {
                return Err(ConfigError::invalid_view(
                    &node.id,
                    format!("阈值占比超出 [0, 1]: {}", rule.ratio),
                ));
            }
        }

        let mut tree = ServiceTree::new(&self.name);
        for node in &self.nodes {
            tree.insert(node.to_service_node(parents.contains(node.id.as_str()), settings))?;
        }
        for node in &self.nodes {
            if let Some(parent) = node.parent.as_deref() {
                tree.attach(&node.id, parent)?;
            }
        }

        tracing::debug!("服务树构建完成: view={}, nodes={}", self.name, tree.len());
        Ok(tree)
    }
}

impl NodeConfig {
    fn to_service_node(&self, is_business: bool, settings: &EngineSettings) -> ServiceNode {
        let zabbix = self.zabbix_algorithm.map(zabbix_calc_rule);

        let aggregation_rule = self
            .aggregation_rule
            .or(zabbix.map(|(rule, _)| rule))
            .unwrap_or(settings.default_aggregation_rule);

        let weight = if self.essential {
            Weight::ESSENTIAL
        } else if let Some(w) = self.weight {
            Weight::new(w)
        } else {
            zabbix.map(|(_, w)| w).unwrap_or(Weight::UNIT)
        };

        let thresholds = match &self.thresholds {
            Some(rules) => rules.clone(),
            None if aggregation_rule == AggregationRule::ThresholdWeighted => {
                settings.default_thresholds.clone()
            }
            None => Vec::new(),
        };

        let node = if is_business {
            ServiceNode::business(&self.id, &self.name, aggregation_rule)
        } else {
            ServiceNode::it_service(&self.id, &self.name)
        };

        node.with_description(self.description.as_deref().unwrap_or_default())
            .with_propagation(
                self.propagation_rule
                    .unwrap_or(settings.default_propagation_rule),
            )
            .with_weight(weight)
            .with_thresholds(thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_view_uses_defaults() {
        let view = ViewConfig::from_json_str(
            r#"{"name":"v","nodes":[
                {"id":"root","name":"Root"},
                {"id":"leaf","name":"Leaf","parent":"root"}
            ]}"#,
        )
        .unwrap();

        let settings = EngineSettings {
            default_propagation_rule: PropagationRule::Increased,
            ..EngineSettings::default()
        };
        let tree = view.build_tree(&settings).unwrap();

        let root = tree.get("root").unwrap();
        assert_eq!(root.aggregation_rule, AggregationRule::Worst);
        assert_eq!(root.propagation_rule, PropagationRule::Increased);
        assert!(tree.get("leaf").unwrap().is_leaf());
    }
}

// ==========================================
// 服务监控看板 - 服务树更新引擎
// ==========================================
// 职责: 检查结果落到叶子节点后,自底向上重算祖先节点
// 状态机: Stale (待重算) → Computing → Settled
// ==========================================
// 处理一个 Stale 节点:
// 1) reset 聚合器并装载本节点阈值
// 2) 逐个喂入子节点 (上报级别, 权重)
// 3) 按聚合规则得到本节点级别
// 4) 按传播规则得到上报级别
// 5) 置 Settled,上报级别有变化时 (或关闭提前终止时) 将父节点置 Stale
// 按深度从深到浅处理,每轮每个节点至多重算一次
// ==========================================

use crate::domain::check::CheckResult;
use crate::domain::node::UpdateState;
use crate::domain::tree::ServiceTree;
use crate::domain::types::{NodeKind, Severity};
use crate::engine::aggregator::StatusAggregator;
use crate::engine::events::{OptionalEventPublisher, StatusEvent, StatusEventType};
use crate::engine::propagation::PropagationEngine;
use crate::perf::{self, PerfGuard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// UpdateReport - 更新轮次报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub pass_id: String,
    pub applied: Vec<String>,  // 已落地的检查结果 (节点ID)
    pub rejected: Vec<String>, // 被拒绝的检查结果 (未知节点/非叶子)
    pub recomputed: usize,     // 重算节点数
    pub changed: Vec<String>,  // 级别有变化的节点
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl UpdateReport {
    fn begin(pass_id: String) -> Self {
        let now = Utc::now();
        Self {
            pass_id,
            applied: Vec::new(),
            rejected: Vec::new(),
            recomputed: 0,
            changed: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }
}

// ==========================================
// TreeUpdater - 服务树更新引擎
// ==========================================
#[derive(Debug)]
pub struct TreeUpdater {
    aggregator: StatusAggregator,
    propagation: PropagationEngine,
    publisher: OptionalEventPublisher,
    early_stop: bool,
    current_pass: Option<String>,
}

impl Default for TreeUpdater {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeUpdater {
    /// 创建更新引擎 (默认开启提前终止,不发布事件)
    pub fn new() -> Self {
        Self {
            aggregator: StatusAggregator::new(),
            propagation: PropagationEngine::new(),
            publisher: OptionalEventPublisher::none(),
            early_stop: true,
            current_pass: None,
        }
    }

    pub fn with_publisher(mut self, publisher: OptionalEventPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    /// 提前终止: 上报级别未变化时不再向上传播
    pub fn with_early_stop(mut self, early_stop: bool) -> Self {
        self.early_stop = early_stop;
        self
    }

    pub fn early_stop(&self) -> bool {
        self.early_stop
    }

    fn pass_id(&mut self) -> String {
        self.current_pass
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    // ==========================================
    // 检查结果落地
    // ==========================================

    /// 将一条检查结果写入叶子节点
    ///
    /// # 返回
    /// - true: 已落地
    /// - false: 节点不存在,或不是无子节点的 IT 服务 (业务节点即使无子节点也不接收检查结果)
    pub fn apply_check(&mut self, tree: &mut ServiceTree, check: &CheckResult) -> bool {
        let idx = match tree.index_of(&check.node_id) {
            Some(idx) => idx,
            None => {
                tracing::warn!("检查结果对应的节点不存在,已忽略: node_id={}", check.node_id);
                return false;
            }
        };

        let target = tree.node(idx);
        if target.kind != NodeKind::ItService || !target.is_leaf() {
            tracing::warn!(
                "检查结果只能落到 IT 服务叶子节点,已忽略: node_id={}",
                check.node_id
            );
            return false;
        }

        let pass_id = self.pass_id();
        let severity = check.severity();
        let node = tree.node_mut(idx);
        let previous = node.reported_severity;

        node.aggregated_severity = severity;
        node.reported_severity = self.propagation.propagate(severity, node.propagation_rule);
        node.diagnostic = if check.message.is_empty() {
            None
        } else {
            Some(check.message.clone())
        };
        node.last_check = Some(check.clone());
        node.update_state = UpdateState::Settled;

        let event = StatusEvent {
            pass_id,
            event_type: StatusEventType::CheckApplied,
            node_id: node.id.clone(),
            previous,
            aggregated: node.aggregated_severity,
            reported: node.reported_severity,
            diagnostic: node.diagnostic.clone(),
        };
        let changed = node.reported_severity != previous;
        self.publisher.publish(event);

        if changed || !self.early_stop {
            mark_parent_stale(tree, idx);
        }
        true
    }

    /// 批量落地检查结果并完成一轮更新
    #[instrument(skip(self, tree, checks), fields(view = %tree.name(), count = checks.len()))]
    pub fn apply_batch(&mut self, tree: &mut ServiceTree, checks: &[CheckResult]) -> UpdateReport {
        let mut applied = Vec::new();
        let mut rejected = Vec::new();
        for check in checks {
            if self.apply_check(tree, check) {
                applied.push(check.node_id.clone());
            } else {
                rejected.push(check.node_id.clone());
            }
        }

        let mut report = self.settle(tree);
        report.applied = applied;
        report.rejected = rejected;
        report
    }

    /// 全量重算: 所有节点置 Stale 后完成一轮更新
    #[instrument(skip(self, tree), fields(view = %tree.name()))]
    pub fn recompute_all(&mut self, tree: &mut ServiceTree) -> UpdateReport {
        for idx in 0..tree.len() {
            tree.node_mut(idx).update_state = UpdateState::Stale;
        }
        self.settle(tree)
    }

    // ==========================================
    // 自底向上重算
    // ==========================================

    /// 处理全部 Stale 节点直到稳定
    #[instrument(skip(self, tree), fields(view = %tree.name()))]
    pub fn settle(&mut self, tree: &mut ServiceTree) -> UpdateReport {
        let pass_id = self.pass_id();
        let mut report = UpdateReport::begin(pass_id.clone());
        let _perf = PerfGuard::new("settle");

        let mut queue: BinaryHeap<(usize, usize)> = (0..tree.len())
            .filter(|&idx| tree.node(idx).update_state == UpdateState::Stale)
            .map(|idx| (tree.depth(idx), idx))
            .collect();

        while let Some((_, idx)) = queue.pop() {
            let (changed, reported_changed) = self.recompute_node(tree, idx, &pass_id);
            report.recomputed += 1;
            if changed {
                report.changed.push(tree.node(idx).id.clone());
            }

            if reported_changed || !self.early_stop {
                if let Some(parent) = tree.parent_of(idx) {
                    if tree.node(parent).update_state != UpdateState::Stale {
                        tree.node_mut(parent).update_state = UpdateState::Stale;
                        queue.push((tree.depth(parent), parent));
                    }
                }
            }
        }

        report.finished_at = Utc::now();
        self.current_pass = None;

        tracing::info!(
            "服务树更新完成: view={}, pass_id={}, recomputed={}, changed={}",
            tree.name(),
            report.pass_id,
            report.recomputed,
            report.changed.len()
        );
        report
    }

    /// 重算单个节点
    ///
    /// # 返回
    /// (聚合或上报级别是否变化, 上报级别是否变化)
    fn recompute_node(
        &mut self,
        tree: &mut ServiceTree,
        idx: usize,
        pass_id: &str,
    ) -> (bool, bool) {
        perf::record_recompute();
        tree.node_mut(idx).update_state = UpdateState::Computing;

        let node = tree.node(idx);
        let previous_aggregated = node.aggregated_severity;
        let previous_reported = node.reported_severity;

        let (aggregated, diagnostic) = if node.is_leaf() {
            // 叶子: 聚合级别来自检查结果
            (node.aggregated_severity, node.diagnostic.clone())
        } else {
            self.aggregator.reset();
            for rule in &node.thresholds {
                self.aggregator.add_threshold_rule(*rule);
            }
            for &child in tree.children_of(idx) {
                let child = tree.node(child);
                self.aggregator.add_severity(child.reported_severity, child.weight);
            }
            let aggregated = self.aggregator.aggregate(node.aggregation_rule);
            (
                aggregated,
                self.aggregator.last_exceeded_message().map(str::to_string),
            )
        };
        let reported = self.propagation.propagate(aggregated, node.propagation_rule);

        let node = tree.node_mut(idx);
        node.aggregated_severity = aggregated;
        node.reported_severity = reported;
        node.diagnostic = diagnostic;
        node.update_state = UpdateState::Settled;

        let changed = aggregated != previous_aggregated || reported != previous_reported;
        if changed {
            tracing::debug!(
                "节点状态变更: node_id={}, aggregated={}→{}, reported={}→{}",
                node.id,
                previous_aggregated,
                aggregated,
                previous_reported,
                reported
            );
            self.publisher.publish(StatusEvent {
                pass_id: pass_id.to_string(),
                event_type: StatusEventType::NodeStatusChanged,
                node_id: node.id.clone(),
                previous: previous_reported,
                aggregated,
                reported,
                diagnostic: node.diagnostic.clone(),
            });
        }

        (changed, reported != previous_reported)
    }
}

/// 将父节点置为 Stale (根节点无操作)
fn mark_parent_stale(tree: &mut ServiceTree, idx: usize) {
    if let Some(parent) = tree.parent_of(idx) {
        tree.node_mut(parent).update_state = UpdateState::Stale;
    }
}

/// 根节点上报级别 (多根时取最差)
pub fn overall_severity(tree: &ServiceTree) -> Severity {
    tree.roots()
        .into_iter()
        .map(|idx| tree.node(idx).reported_severity)
        .max()
        .unwrap_or(Severity::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::ServiceNode;
    use crate::domain::threshold::ThresholdRule;
    use crate::domain::types::{AggregationRule, PropagationRule};
    use crate::domain::weight::Weight;
    use crate::engine::events::CollectingEventPublisher;
    use std::sync::Arc;

    fn two_level_tree() -> ServiceTree {
        let mut tree = ServiceTree::new("unit");
        tree.insert(ServiceNode::business("root", "Root", AggregationRule::Worst))
            .unwrap();
        tree.add_child("root", ServiceNode::it_service("a", "A")).unwrap();
        tree.add_child("root", ServiceNode::it_service("b", "B")).unwrap();
        tree
    }

    #[test]
    fn test_check_on_childless_business_node_rejected() {
        let mut tree = two_level_tree();
        tree.add_child("root", ServiceNode::business("group", "Group", AggregationRule::Worst))
            .unwrap();
        let mut updater = TreeUpdater::new();

        assert!(!updater.apply_check(&mut tree, &CheckResult::new("group", 3, "down")));
        assert!(updater.apply_check(&mut tree, &CheckResult::new("a", 3, "down")));

        let report = updater.apply_batch(&mut tree, &[CheckResult::new("group", 0, "")]);
        assert_eq!(report.rejected, vec!["group".to_string()]);
        assert_eq!(tree.get("group").unwrap().aggregated_severity, Severity::Normal);
    }

    #[test]
    fn test_fresh_tree_settles_business_nodes() {
        let mut tree = two_level_tree();
        let mut updater = TreeUpdater::new();

        let report = updater.settle(&mut tree);

        // 叶子尚无数据 → Unknown,Worst 规则下根节点为 Unknown
        assert_eq!(report.recomputed, 1);
        assert_eq!(tree.get("root").unwrap().aggregated_severity, Severity::Unknown);
    }

    #[test]
    fn test_leaf_change_propagates_to_root() {
        let mut tree = two_level_tree();
        let mut updater = TreeUpdater::new();
        updater.apply_batch(
            &mut tree,
            &[CheckResult::new("a", 0, "OK"), CheckResult::new("b", 0, "OK")],
        );
        assert_eq!(tree.get("root").unwrap().reported_severity, Severity::Normal);

        let report = updater.apply_batch(&mut tree, &[CheckResult::new("b", 3, "down")]);

        assert_eq!(report.applied, vec!["b".to_string()]);
        assert!(report.changed.contains(&"root".to_string()));
        assert_eq!(tree.get("root").unwrap().reported_severity, Severity::Critical);
        assert_eq!(tree.get("b").unwrap().diagnostic.as_deref(), Some("down"));
    }

    #[test]
    fn test_unknown_and_non_leaf_checks_rejected() {
        let mut tree = two_level_tree();
        let mut updater = TreeUpdater::new();

        let report = updater.apply_batch(
            &mut tree,
            &[CheckResult::new("ghost", 2, ""), CheckResult::new("root", 2, "")],
        );

        assert!(report.applied.is_empty());
        assert_eq!(report.rejected, vec!["ghost".to_string(), "root".to_string()]);
    }

    #[test]
    fn test_unchanged_leaf_does_not_recompute_parent() {
        let mut tree = two_level_tree();
        let mut updater = TreeUpdater::new();
        updater.apply_batch(
            &mut tree,
            &[CheckResult::new("a", 1, ""), CheckResult::new("b", 0, "")],
        );

        let report = updater.apply_batch(&mut tree, &[CheckResult::new("a", 1, "")]);
        assert_eq!(report.recomputed, 0);

        let mut eager = TreeUpdater::new().with_early_stop(false);
        let report = eager.apply_batch(&mut tree, &[CheckResult::new("a", 1, "")]);
        assert_eq!(report.recomputed, 1);
        assert_eq!(tree.get("root").unwrap().reported_severity, Severity::Minor);
    }

    #[test]
    fn test_threshold_diagnostic_recorded_on_node() {
        let mut tree = ServiceTree::new("thresholds");
        tree.insert(
            ServiceNode::business("root", "Root", AggregationRule::ThresholdWeighted)
                .with_thresholds(vec![ThresholdRule::new(
                    Severity::Minor,
                    0.5,
                    Severity::Critical,
                )]),
        )
        .unwrap();
        for id in ["a", "b", "c"] {
            tree.add_child("root", ServiceNode::it_service(id, id)).unwrap();
        }

        let mut updater = TreeUpdater::new();
        updater.apply_batch(
            &mut tree,
            &[
                CheckResult::new("a", 1, ""),
                CheckResult::new("b", 1, ""),
                CheckResult::new("c", 0, ""),
            ],
        );

        let root = tree.get("root").unwrap();
        assert_eq!(root.aggregated_severity, Severity::Critical);
        assert!(root.diagnostic.is_some());
    }

    #[test]
    fn test_propagation_rule_applied_on_report() {
        let mut tree = ServiceTree::new("prop");
        tree.insert(ServiceNode::business("root", "Root", AggregationRule::Worst))
            .unwrap();
        tree.add_child(
            "root",
            ServiceNode::business("svc", "Svc", AggregationRule::Worst)
                .with_propagation(PropagationRule::Increased)
                .with_weight(Weight::UNIT),
        )
        .unwrap();
        tree.add_child("svc", ServiceNode::it_service("leaf", "Leaf")).unwrap();

        let mut updater = TreeUpdater::new();
        updater.apply_batch(&mut tree, &[CheckResult::new("leaf", 1, "")]);

        let svc = tree.get("svc").unwrap();
        assert_eq!(svc.aggregated_severity, Severity::Minor);
        assert_eq!(svc.reported_severity, Severity::Major);
        assert_eq!(tree.get("root").unwrap().aggregated_severity, Severity::Major);
    }

    #[test]
    fn test_events_published_with_pass_id() {
        let collector = Arc::new(CollectingEventPublisher::new());
        let mut tree = two_level_tree();
        let mut updater = TreeUpdater::new()
            .with_publisher(OptionalEventPublisher::with_publisher(collector.clone()));

        let report = updater.apply_batch(
            &mut tree,
            &[CheckResult::new("a", 2, ""), CheckResult::new("b", 0, "")],
        );

        let events = collector.take();
        assert!(events.iter().all(|e| e.pass_id == report.pass_id));
        assert_eq!(
            events
                .iter()
                .filter(|e| e.event_type == StatusEventType::CheckApplied)
                .count(),
            2
        );
        assert!(events
            .iter()
            .any(|e| e.event_type == StatusEventType::NodeStatusChanged && e.node_id == "root"));
    }
}

// ==========================================
// 服务监控看板 - QoS 采样引擎
// ==========================================
// 职责: 视图根节点状态 + 叶子检查项级别分布 → QosSnapshot
// 导出: CSV (每行一个快照)
// ==========================================

use crate::domain::qos::QosSnapshot;
use crate::domain::tree::ServiceTree;
use crate::domain::types::Severity;
use chrono::Utc;
use std::io::Write;

// ==========================================
// QosEngine - QoS 采样引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct QosEngine;

impl QosEngine {
    pub fn new() -> Self {
        Self
    }

    /// 对某根节点采样
    ///
    /// # 返回
    /// - None: 节点不存在
    pub fn compute(&self, tree: &ServiceTree, root_id: &str) -> Option<QosSnapshot> {
        let root = tree.index_of(root_id)?;
        let leaves = tree.leaves_under(root);

        let mut counts = [0usize; Severity::COUNT];
        for &leaf in &leaves {
            counts[tree.node(leaf).aggregated_severity.index()] += 1;
        }
        let total = leaves.len();
        let percent = |sev: Severity| -> f32 {
            if total == 0 {
                0.0
            } else {
                counts[sev.index()] as f32 * 100.0 / total as f32
            }
        };

        Some(QosSnapshot {
            timestamp: Utc::now().timestamp(),
            view_name: tree.name().to_string(),
            status: tree.node(root).reported_severity,
            normal: percent(Severity::Normal),
            minor: percent(Severity::Minor),
            major: percent(Severity::Major),
            critical: percent(Severity::Critical),
            unknown: percent(Severity::Unknown),
        })
    }

    /// 导出 CSV (含表头)
    pub fn write_csv<W: Write>(&self, writer: W, snapshots: &[QosSnapshot]) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for snapshot in snapshots {
            csv_writer.serialize(snapshot)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

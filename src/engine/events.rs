// ==========================================
// 服务监控看板 - 引擎层事件发布
// ==========================================
// 职责: 定义节点状态变更事件发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,展示层 (看板/通知) 实现适配器
// ==========================================

use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 状态事件类型
// ==========================================

/// 状态事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEventType {
    /// 节点聚合级别或上报级别变更
    NodeStatusChanged,
    /// 叶子节点收到新的检查结果
    CheckApplied,
}

impl StatusEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            StatusEventType::NodeStatusChanged => "NodeStatusChanged",
            StatusEventType::CheckApplied => "CheckApplied",
        }
    }
}

/// 状态事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// 所属更新轮次
    pub pass_id: String,
    /// 事件类型
    pub event_type: StatusEventType,
    /// 节点 ID
    pub node_id: String,
    /// 变更前上报级别
    pub previous: Severity,
    /// 变更后聚合级别
    pub aggregated: Severity,
    /// 变更后上报级别
    pub reported: Severity,
    /// 阈值命中说明 / 检查输出
    pub diagnostic: Option<String>,
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 状态事件发布者 Trait
///
/// Engine 层定义,展示层实现
pub trait StatusEventPublisher: Send + Sync {
    /// 发布状态事件
    fn publish(&self, event: StatusEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl StatusEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: StatusEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::trace!(
            "NoOpEventPublisher: 跳过事件发布 - node_id={}, event_type={}",
            event.node_id,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 内存收集发布者 (调试/测试用)
#[derive(Debug, Default)]
pub struct CollectingEventPublisher {
    events: Mutex<Vec<StatusEvent>>,
}

impl CollectingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取走已收集的事件
    pub fn take(&self) -> Vec<StatusEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl StatusEventPublisher for CollectingEventPublisher {
    fn publish(&self, event: StatusEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut guard = self.events.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        guard.push(event);
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn StatusEventPublisher>> 的使用
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn StatusEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn StatusEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例 (不发布事件)
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件 (发布失败只记录日志,不中断更新)
    pub fn publish(&self, event: StatusEvent) {
        if let Some(publisher) = &self.inner {
            let node_id = event.node_id.clone();
            if let Err(e) = publisher.publish(event) {
                tracing::warn!("状态事件发布失败: node_id={}, error={}", node_id, e);
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for OptionalEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalEventPublisher")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(node_id: &str) -> StatusEvent {
        StatusEvent {
            pass_id: "P001".to_string(),
            event_type: StatusEventType::NodeStatusChanged,
            node_id: node_id.to_string(),
            previous: Severity::Normal,
            aggregated: Severity::Major,
            reported: Severity::Major,
            diagnostic: None,
        }
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        publisher.publish(sample_event("web"));
    }

    #[test]
    fn test_optional_publisher_forwards_to_collector() {
        let collector = Arc::new(CollectingEventPublisher::new());
        let publisher = OptionalEventPublisher::with_publisher(collector.clone());
        assert!(publisher.is_configured());

        publisher.publish(sample_event("web"));
        publisher.publish(sample_event("db"));

        let events = collector.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].node_id, "db");
        assert!(collector.take().is_empty());
    }

    #[test]
    fn test_event_type_as_str() {
        assert_eq!(StatusEventType::NodeStatusChanged.as_str(), "NodeStatusChanged");
        assert_eq!(StatusEventType::CheckApplied.as_str(), "CheckApplied");
    }
}

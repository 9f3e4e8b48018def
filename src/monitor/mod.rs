// ==========================================
// 服务监控看板 - 轮询层
// ==========================================
// 职责: 从监控后端拉取检查结果,驱动服务树更新周期
// 红线: 轮询层不实现聚合规则,只调用 Engine
// ==========================================

pub mod cycle;
pub mod error;
pub mod source;

pub use cycle::{CycleReport, StatusMonitor};
pub use error::{MonitorError, MonitorResult};
pub use source::{CheckSource, FileCheckSource, RawCheck, StaticCheckSource};

// ==========================================
// 服务监控看板 - 领域层错误类型
// ==========================================
// 职责: 服务树拓扑构建错误
// 说明: 聚合/传播计算本身不产生错误 (非法输入一律宽松归一化)
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 服务树拓扑错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("节点ID重复: {id}")]
    DuplicateNode { id: String },

    #[error("节点未找到: {id}")]
    NodeNotFound { id: String },

    #[error("节点已有父节点: node={id}, parent={parent}")]
    ParentAlreadySet { id: String, parent: String },

    #[error("检测到环: node={id}, parent={parent}")]
    CycleDetected { id: String, parent: String },
}

/// Result 类型别名
pub type TreeResult<T> = Result<T, TreeError>;

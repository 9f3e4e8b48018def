// ==========================================
// 服务监控看板 - 轮询层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::config::error::ConfigError;
use thiserror::Error;

/// 轮询层错误类型
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("检查源拉取失败 (source={source_name}): {message}")]
    SourceFailed { source_name: String, message: String },

    #[error("检查源拉取超时 (source={source_name}): {timeout_ms}ms")]
    Timeout { source_name: String, timeout_ms: u64 },

    #[error("全部检查源拉取失败: count={count}")]
    AllSourcesFailed { count: usize },

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("检查结果解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type MonitorResult<T> = Result<T, MonitorError>;

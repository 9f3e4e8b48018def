// ==========================================
// 服务监控看板 - 配置层
// ==========================================
// 职责: 系统配置管理 + 视图描述加载
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod view_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, EngineSettings, MonitorSettings};
pub use error::{ConfigError, ConfigResult};
pub use view_config::{NodeConfig, ViewConfig};

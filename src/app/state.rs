// ==========================================
// 服务监控看板 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态 (配置 + 事件发布器),组装轮询周期驱动
// ==========================================

use std::sync::Arc;

use crate::config::config_manager::{ConfigManager, EngineSettings, MonitorSettings};
use crate::config::error::ConfigResult;
use crate::config::view_config::ViewConfig;
use crate::engine::events::{OptionalEventPublisher, StatusEventPublisher};
use crate::engine::tree_updater::TreeUpdater;
use crate::monitor::cycle::StatusMonitor;

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 启动时加载的引擎配置
    pub engine_settings: EngineSettings,

    /// 启动时加载的轮询配置
    pub monitor_settings: MonitorSettings,

    /// 状态事件发布器 (看板推送/通知)
    pub event_publisher: OptionalEventPublisher,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开数据库并建表
    /// 2. 加载引擎配置与轮询配置 (非法配置直接报错)
    pub fn new(db_path: String) -> ConfigResult<Self> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let config_manager = Arc::new(ConfigManager::new(&db_path)?);
        let engine_settings = config_manager.load_engine_settings()?;
        let monitor_settings = config_manager.load_monitor_settings()?;

        tracing::info!(
            "AppState初始化完成: default_rule={}, early_stop={}, poll_interval={}s",
            engine_settings.default_aggregation_rule,
            engine_settings.early_stop,
            monitor_settings.poll_interval_secs
        );

        Ok(Self {
            db_path,
            config_manager,
            engine_settings,
            monitor_settings,
            event_publisher: OptionalEventPublisher::none(),
        })
    }

    /// 注入事件发布器
    pub fn with_event_publisher(mut self, publisher: Arc<dyn StatusEventPublisher>) -> Self {
        self.event_publisher = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }

    /// 按当前配置创建更新引擎
    pub fn build_updater(&self) -> TreeUpdater {
        TreeUpdater::new()
            .with_early_stop(self.engine_settings.early_stop)
            .with_publisher(self.event_publisher.clone())
    }

    /// 由视图描述组装轮询周期驱动 (检查源由调用方注册)
    pub fn build_monitor(&self, view: &ViewConfig) -> ConfigResult<StatusMonitor> {
        let tree = view.build_tree(&self.engine_settings)?;
        Ok(StatusMonitor::new(
            tree,
            self.build_updater(),
            self.monitor_settings.clone(),
        ))
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SVC_STATUS_DB_PATH (非空时)
/// - 开发环境: 用户数据目录/svc-status-dev/svc_status.db
/// - 生产环境: 用户数据目录/svc-status/svc_status.db
/// - 取不到用户数据目录时: ./svc_status.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SVC_STATUS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./svc_status.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("svc-status-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("svc-status");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("svc_status.db"),
            Err(e) => tracing::warn!("无法创建数据目录,使用当前目录: {}", e),
        }
    }

    path.to_string_lossy().to_string()
}

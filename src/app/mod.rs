// ==========================================
// 服务监控看板 - 应用层
// ==========================================
// 职责: 组装配置、引擎与轮询层
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};

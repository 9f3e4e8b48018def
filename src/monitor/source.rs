// ==========================================
// 服务监控看板 - 检查结果来源
// ==========================================
// 职责: 定义检查源 trait,实现依赖倒置
// 说明: 轮询层只依赖 CheckSource,具体后端 (文件/静态/HTTP) 由调用方注入
// ==========================================

use crate::domain::check::CheckResult;
use crate::domain::types::MonitorKind;
use crate::monitor::error::MonitorResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;

// ==========================================
// CheckSource Trait
// ==========================================
#[async_trait]
pub trait CheckSource: Send + Sync {
    /// 检查源名称 (日志用)
    fn name(&self) -> &str;

    /// 监控后端类型
    fn kind(&self) -> MonitorKind;

    /// 拉取一批检查结果 (严重级别已归一化)
    async fn fetch_checks(&self) -> MonitorResult<Vec<CheckResult>>;
}

// ==========================================
// 后端原生检查记录
// ==========================================
#[derive(Debug, Clone, Deserialize)]
pub struct RawCheck {
    pub node_id: String,
    pub status: i32, // 后端原生状态码
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: String,
}

impl RawCheck {
    /// 按后端映射表归一化
    pub fn normalize(self, kind: MonitorKind) -> CheckResult {
        CheckResult {
            severity: kind.to_severity(self.status).as_raw(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            node_id: self.node_id,
            message: self.message,
        }
    }
}

// ==========================================
// FileCheckSource - JSON 文件检查源
// ==========================================
// 文件内容: [ { "node_id", "status", "timestamp"?, "message"? } ]
#[derive(Debug, Clone)]
pub struct FileCheckSource {
    name: String,
    kind: MonitorKind,
    path: PathBuf,
}

impl FileCheckSource {
    pub fn new(name: &str, kind: MonitorKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            path: path.into(),
        }
    }
}

#[async_trait]
impl CheckSource for FileCheckSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MonitorKind {
        self.kind
    }

    async fn fetch_checks(&self) -> MonitorResult<Vec<CheckResult>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<RawCheck> = serde_json::from_str(&raw)?;
        tracing::debug!(
            source = %self.name,
            path = %self.path.display(),
            count = records.len(),
            "检查结果文件已读取"
        );
        Ok(records
            .into_iter()
            .map(|record| record.normalize(self.kind))
            .collect())
    }
}

// ==========================================
// StaticCheckSource - 固定批次检查源
// ==========================================
#[derive(Debug, Clone)]
pub struct StaticCheckSource {
    name: String,
    kind: MonitorKind,
    checks: Vec<CheckResult>,
}

impl StaticCheckSource {
    /// # 参数
    /// - `checks`: 已归一化的检查结果,每次拉取原样返回
    pub fn new(name: &str, kind: MonitorKind, checks: Vec<CheckResult>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            checks,
        }
    }
}

#[async_trait]
impl CheckSource for StaticCheckSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MonitorKind {
        self.kind
    }

    async fn fetch_checks(&self) -> MonitorResult<Vec<CheckResult>> {
        Ok(self.checks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Severity;

    #[test]
    fn test_raw_check_normalized_by_backend() {
        let raw = RawCheck {
            node_id: "db".to_string(),
            status: 1,
            timestamp: None,
            message: "WARNING".to_string(),
        };

        let check = raw.clone().normalize(MonitorKind::Nagios);
        assert_eq!(check.severity(), Severity::Major);

        let check = raw.normalize(MonitorKind::Zabbix);
        assert_eq!(check.severity(), Severity::Normal);
    }

    #[tokio::test]
    async fn test_file_source_reads_and_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.json");
        std::fs::write(
            &path,
            r#"[{"node_id":"web","status":2,"message":"down"},{"node_id":"dns","status":0}]"#,
        )
        .unwrap();

        let source = FileCheckSource::new("nagios", MonitorKind::Nagios, &path);
        let checks = source.fetch_checks().await.unwrap();

        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].severity(), Severity::Critical);
        assert_eq!(checks[0].message, "down");
        assert_eq!(checks[1].severity(), Severity::Normal);
    }
}

// ==========================================
// 服务监控看板 - 轮询周期驱动
// ==========================================
// 一个周期:
// 1) 并发拉取全部检查源 (每个源独立超时)
// 2) 失败的源只记录日志,全部失败时本周期报错
// 3) 合并后的批次一次性落地,完成一轮更新
// 红线: 周期之间串行 (&mut self),不重叠
// ==========================================

use crate::config::config_manager::MonitorSettings;
use crate::domain::check::CheckResult;
use crate::domain::tree::ServiceTree;
use crate::engine::tree_updater::{TreeUpdater, UpdateReport};
use crate::monitor::error::{MonitorError, MonitorResult};
use crate::monitor::source::CheckSource;
use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;
use tracing::instrument;

/// 单个周期报告
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub sources_ok: usize,
    pub sources_failed: Vec<String>,
    pub update: UpdateReport,
}

// ==========================================
// StatusMonitor - 轮询周期驱动
// ==========================================
pub struct StatusMonitor {
    tree: ServiceTree,
    updater: TreeUpdater,
    sources: Vec<Box<dyn CheckSource>>,
    settings: MonitorSettings,
    cycles: u64,
}

impl StatusMonitor {
    pub fn new(tree: ServiceTree, updater: TreeUpdater, settings: MonitorSettings) -> Self {
        Self {
            tree,
            updater,
            sources: Vec::new(),
            settings,
            cycles: 0,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn CheckSource>) {
        tracing::info!("注册检查源: name={}, kind={}", source.name(), source.kind());
        self.sources.push(source);
    }

    pub fn tree(&self) -> &ServiceTree {
        &self.tree
    }

    pub fn into_tree(self) -> ServiceTree {
        self.tree
    }

    /// 已完成的周期数
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// 执行一个轮询周期
    ///
    /// # 错误
    /// - AllSourcesFailed: 至少注册了一个源且全部失败 (此时不更新服务树)
    #[instrument(skip(self), fields(view = %self.tree.name(), cycle = self.cycles + 1))]
    pub async fn run_cycle(&mut self) -> MonitorResult<CycleReport> {
        let timeout = self.settings.fetch_timeout();
        let fetches = self.sources.iter().map(|source| async move {
            let name = source.name().to_string();
            let result = match tokio::time::timeout(timeout, source.fetch_checks()).await {
                Ok(Ok(checks)) => Ok(checks),
                Ok(Err(e)) => Err(MonitorError::SourceFailed {
                    source_name: name.clone(),
                    message: e.to_string(),
                }),
                Err(_) => Err(MonitorError::Timeout {
                    source_name: name.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            (name, result)
        });
        let results = join_all(fetches).await;

        let mut batch: Vec<CheckResult> = Vec::new();
        let mut sources_ok = 0;
        let mut sources_failed = Vec::new();
        for (name, result) in results {
            match result {
                Ok(checks) => {
                    sources_ok += 1;
                    batch.extend(checks);
                }
                Err(e) => {
                    tracing::warn!(source = %name, error = %e, "检查源拉取失败");
                    sources_failed.push(name);
                }
            }
        }

        if sources_ok == 0 && !sources_failed.is_empty() {
            return Err(MonitorError::AllSourcesFailed {
                count: sources_failed.len(),
            });
        }

        let update = self.updater.apply_batch(&mut self.tree, &batch);
        self.cycles += 1;

        tracing::info!(
            "轮询周期完成: cycle={}, sources_ok={}, sources_failed={}, checks={}",
            self.cycles,
            sources_ok,
            sources_failed.len(),
            batch.len()
        );

        Ok(CycleReport {
            cycle: self.cycles,
            sources_ok,
            sources_failed,
            update,
        })
    }

    /// 按固定间隔循环执行周期
    ///
    /// # 参数
    /// - `interval`: 周期间隔 (首个周期立即执行)
    /// - `max_cycles`: 最多执行的周期数,None 表示不限
    ///
    /// # 返回
    /// 成功完成的周期数
    pub async fn run(&mut self, interval: Duration, max_cycles: Option<u64>) -> MonitorResult<u64> {
        let mut ticker = tokio::time::interval(interval);
        let mut attempts = 0u64;
        let mut completed = 0u64;

        loop {
            if max_cycles.is_some_and(|max| attempts >= max) {
                break;
            }
            ticker.tick().await;
            attempts += 1;

            match self.run_cycle().await {
                Ok(_) => completed += 1,
                Err(e) => tracing::warn!(error = %e, "轮询周期失败,等待下一周期"),
            }
        }

        Ok(completed)
    }

    /// 使用配置中的轮询间隔
    pub async fn run_with_settings(&mut self, max_cycles: Option<u64>) -> MonitorResult<u64> {
        let interval = self.settings.poll_interval();
        self.run(interval, max_cycles).await
    }
}

impl std::fmt::Debug for StatusMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMonitor")
            .field("view", &self.tree.name())
            .field("sources", &self.sources.len())
            .field("cycles", &self.cycles)
            .finish()
    }
}

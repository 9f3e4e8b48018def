// ==========================================
// StatusMonitor 集成测试
// ==========================================
// 测试目标: 验证并发拉取、单源失败/超时容错、全部失败报错与周期循环
// ==========================================


use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use svc_status::config::MonitorSettings;
use svc_status::domain::{CheckResult, MonitorKind, Severity};
use svc_status::engine::{CollectingEventPublisher, OptionalEventPublisher, TreeUpdater};
use svc_status::logging;
use svc_status::monitor::{
    CheckSource, FileCheckSource, MonitorError, MonitorResult, StaticCheckSource, StatusMonitor,
};
use test_helpers::build_sample_tree;

/// 总是失败的检查源
struct FailingSource;

#[async_trait]
impl CheckSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn kind(&self) -> MonitorKind {
        MonitorKind::Zabbix
    }

    async fn fetch_checks(&self) -> MonitorResult<Vec<CheckResult>> {
        Err(anyhow::anyhow!("connection refused").into())
    }
}

/// 响应慢于超时的检查源
struct SlowSource;

#[async_trait]
impl CheckSource for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    fn kind(&self) -> MonitorKind {
        MonitorKind::Nagios
    }

    async fn fetch_checks(&self) -> MonitorResult<Vec<CheckResult>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(vec![CheckResult::new("web1", 3, "late")])
    }
}

fn fast_settings() -> MonitorSettings {
    MonitorSettings {
        poll_interval_secs: 1,
        fetch_timeout_ms: 50,
    }
}

fn healthy_batch() -> Vec<CheckResult> {
    vec![
        CheckResult::new("web1", 0, ""),
        CheckResult::new("web2", 0, ""),
        CheckResult::new("db", 0, ""),
        CheckResult::new("cache", 0, ""),
    ]
}

#[tokio::test]
async fn test_cycle_merges_batches_from_all_sources() {
    // 初始化日志系统
    logging::init_test();

    let mut monitor = StatusMonitor::new(build_sample_tree(), TreeUpdater::new(), fast_settings());
    monitor.add_source(Box::new(StaticCheckSource::new(
        "nagios",
        MonitorKind::Nagios,
        healthy_batch(),
    )));
    monitor.add_source(Box::new(StaticCheckSource::new(
        "zabbix",
        MonitorKind::Zabbix,
        vec![
            CheckResult::new("queue", 0, ""),
            CheckResult::new("dns", 0, ""),
        ],
    )));

    let report = monitor.run_cycle().await.unwrap();

    assert_eq!(report.cycle, 1);
    assert_eq!(report.sources_ok, 2);
    assert!(report.sources_failed.is_empty());
    assert_eq!(report.update.applied.len(), 6);
    assert_eq!(
        monitor.tree().get("shop").unwrap().reported_severity,
        Severity::Normal
    );
}

#[tokio::test]
async fn test_failing_and_slow_sources_do_not_block_others() {
    // 初始化日志系统
    logging::init_test();

    let mut monitor = StatusMonitor::new(build_sample_tree(), TreeUpdater::new(), fast_settings());
    monitor.add_source(Box::new(FailingSource));
    monitor.add_source(Box::new(SlowSource));
    monitor.add_source(Box::new(StaticCheckSource::new(
        "nagios",
        MonitorKind::Nagios,
        healthy_batch(),
    )));

    let report = monitor.run_cycle().await.unwrap();

    assert_eq!(report.sources_ok, 1);
    assert_eq!(
        report.sources_failed,
        vec!["failing".to_string(), "slow".to_string()]
    );
    assert_eq!(report.update.applied.len(), 4);
    // web1 的超时结果未落地
    assert_eq!(
        monitor.tree().get("web1").unwrap().aggregated_severity,
        Severity::Normal
    );
    // queue / dns 尚无数据
    assert_eq!(
        monitor.tree().get("dns").unwrap().aggregated_severity,
        Severity::Unknown
    );
}

#[tokio::test]
async fn test_all_sources_failed_is_error_and_tree_untouched() {
    // 初始化日志系统
    logging::init_test();

    let mut monitor = StatusMonitor::new(build_sample_tree(), TreeUpdater::new(), fast_settings());
    monitor.add_source(Box::new(FailingSource));
    monitor.add_source(Box::new(SlowSource));

    let err = monitor.run_cycle().await.unwrap_err();

    assert!(matches!(err, MonitorError::AllSourcesFailed { count: 2 }));
    assert_eq!(monitor.cycles(), 0);
    assert_eq!(
        monitor.tree().get("shop").unwrap().aggregated_severity,
        Severity::Normal,
        "失败周期不应触发重算"
    );
}

#[tokio::test]
async fn test_file_source_maps_backend_codes() {
    // 初始化日志系统
    logging::init_test();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zabbix.json");
    std::fs::write(
        &path,
        r#"[
            {"node_id":"web1","status":4,"message":"High"},
            {"node_id":"web2","status":1},
            {"node_id":"ghost","status":5}
        ]"#,
    )
    .unwrap();

    let mut monitor = StatusMonitor::new(build_sample_tree(), TreeUpdater::new(), fast_settings());
    monitor.add_source(Box::new(FileCheckSource::new("zabbix", MonitorKind::Zabbix, &path)));

    let report = monitor.run_cycle().await.unwrap();

    assert_eq!(report.update.rejected, vec!["ghost".to_string()]);
    let tree = monitor.tree();
    assert_eq!(tree.get("web1").unwrap().aggregated_severity, Severity::Critical);
    assert_eq!(tree.get("web2").unwrap().aggregated_severity, Severity::Normal);
    assert_eq!(tree.get("frontend").unwrap().aggregated_severity, Severity::Critical);
}

#[tokio::test]
async fn test_run_executes_bounded_cycles_and_publishes_events() {
    // 初始化日志系统
    logging::init_test();

    let collector = Arc::new(CollectingEventPublisher::new());
    let updater = TreeUpdater::new()
        .with_publisher(OptionalEventPublisher::with_publisher(collector.clone()));
    let mut monitor = StatusMonitor::new(build_sample_tree(), updater, fast_settings());
    monitor.add_source(Box::new(StaticCheckSource::new(
        "nagios",
        MonitorKind::Nagios,
        healthy_batch(),
    )));

    let completed = monitor
        .run(Duration::from_millis(10), Some(3))
        .await
        .unwrap();

    assert_eq!(completed, 3);
    assert_eq!(monitor.cycles(), 3);

    let events = collector.take();
    let passes: std::collections::HashSet<&str> =
        events.iter().map(|e| e.pass_id.as_str()).collect();
    assert_eq!(passes.len(), 3, "每个周期一个 pass_id");
}

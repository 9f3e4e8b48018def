// ==========================================
// 服务监控看板 - 命令行入口
// ==========================================
// 用法:
//   svc-status <view.json> <checks.json> [nagios|zabbix|zenoss] [db_path]
// 执行一个轮询周期,输出节点状态 JSON 与根节点 QoS CSV
// ==========================================

use anyhow::{bail, Context};
use std::str::FromStr;
use svc_status::app::{get_default_db_path, AppState};
use svc_status::config::ViewConfig;
use svc_status::domain::MonitorKind;
use svc_status::engine::QosEngine;
use svc_status::monitor::FileCheckSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    svc_status::logging::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!(
            "用法: {} <view.json> <checks.json> [nagios|zabbix|zenoss] [db_path]",
            args.first().map(String::as_str).unwrap_or("svc-status")
        );
    }
    let view_path = &args[1];
    let checks_path = &args[2];
    let kind = match args.get(3) {
        Some(raw) => MonitorKind::from_str(raw).map_err(anyhow::Error::msg)?,
        None => MonitorKind::Nagios,
    };
    let db_path = args.get(4).cloned().unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", svc_status::APP_NAME, svc_status::VERSION);
    tracing::info!("==================================================");

    let state = AppState::new(db_path).context("无法初始化AppState")?;
    let view = ViewConfig::load(view_path).with_context(|| format!("无法加载视图: {}", view_path))?;

    let mut monitor = state.build_monitor(&view)?;
    monitor.add_source(Box::new(FileCheckSource::new(
        &kind.to_string().to_lowercase(),
        kind,
        checks_path,
    )));

    let report = monitor.run_cycle().await?;
    tracing::info!(
        "周期完成: recomputed={}, changed={}, rejected={}",
        report.update.recomputed,
        report.update.changed.len(),
        report.update.rejected.len()
    );

    let tree = monitor.tree();
    println!("{}", serde_json::to_string_pretty(&tree.snapshot())?);

    let qos = QosEngine::new();
    let snapshots: Vec<_> = tree
        .roots()
        .into_iter()
        .filter_map(|idx| qos.compute(tree, &tree.node(idx).id))
        .collect();
    qos.write_csv(std::io::stdout(), &snapshots)?;

    Ok(())
}

// ==========================================
// 服务监控看板 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::threshold::ThresholdRule;
use crate::domain::types::{AggregationRule, PropagationRule};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

// ==========================================
// 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub default_aggregation_rule: AggregationRule, // 视图未指定时的聚合规则
    pub default_propagation_rule: PropagationRule, // 视图未指定时的传播规则
    pub default_thresholds: Vec<ThresholdRule>,    // ThresholdWeighted 节点的默认阈值
    pub early_stop: bool,                          // 上报级别不变时停止向上传播
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_aggregation_rule: AggregationRule::Worst,
            default_propagation_rule: PropagationRule::Unchanged,
            default_thresholds: Vec::new(),
            early_stop: true,
        }
    }
}

// ==========================================
// 轮询配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub poll_interval_secs: u64,
    pub fetch_timeout_ms: u64,
}

impl MonitorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            fetch_timeout_ms: 10_000,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例 (不存在的表会自动创建)
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 会对传入连接再次应用统一 PRAGMA 并建表 (幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = lock(&conn)?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    // ==========================================
    // 原始读写
    // ==========================================

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = lock(&self.conn)?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值 (存在则覆盖)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(config_key = key, value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ==========================================
    // 类型化配置
    // ==========================================

    /// 读取引擎配置 (缺省项使用默认值,非法值报错)
    pub fn load_engine_settings(&self) -> ConfigResult<EngineSettings> {
        let aggregation_raw =
            self.get_config_or_default(config_keys::DEFAULT_AGGREGATION_RULE, "WORST")?;
        let default_aggregation_rule = AggregationRule::from_str(&aggregation_raw)
            .map_err(|e| ConfigError::invalid_value(config_keys::DEFAULT_AGGREGATION_RULE, e))?;

        let propagation_raw =
            self.get_config_or_default(config_keys::DEFAULT_PROPAGATION_RULE, "UNCHANGED")?;
        let default_propagation_rule = PropagationRule::from_str(&propagation_raw)
            .map_err(|e| ConfigError::invalid_value(config_keys::DEFAULT_PROPAGATION_RULE, e))?;

        let thresholds_raw = self.get_config_or_default(config_keys::DEFAULT_THRESHOLDS, "[]")?;
        let default_thresholds: Vec<ThresholdRule> =
            serde_json::from_str(&thresholds_raw).map_err(|e| {
                ConfigError::invalid_value(config_keys::DEFAULT_THRESHOLDS, e.to_string())
            })?;
        if let Some(rule) = default_thresholds.iter().find(|r| !r.is_ratio_valid()) {
            return Err(ConfigError::invalid_value(
                config_keys::DEFAULT_THRESHOLDS,
                format!("阈值占比超出 [0, 1]: {}", rule.ratio),
            ));
        }

        let early_stop_raw = self.get_config_or_default(config_keys::EARLY_STOP, "true")?;
        let early_stop = parse_bool(&early_stop_raw).ok_or_else(|| {
            ConfigError::invalid_value(config_keys::EARLY_STOP, early_stop_raw.clone())
        })?;

        Ok(EngineSettings {
            default_aggregation_rule,
            default_propagation_rule,
            default_thresholds,
            early_stop,
        })
    }

    /// 读取轮询配置
    pub fn load_monitor_settings(&self) -> ConfigResult<MonitorSettings> {
        let poll_interval_secs = self.get_positive_u64(config_keys::POLL_INTERVAL_SECS, 60)?;
        let fetch_timeout_ms = self.get_positive_u64(config_keys::FETCH_TIMEOUT_MS, 10_000)?;

        Ok(MonitorSettings {
            poll_interval_secs,
            fetch_timeout_ms,
        })
    }

    fn get_positive_u64(&self, key: &str, default: u64) -> ConfigResult<u64> {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(v) if v > 0 => Ok(v),
                _ => Err(ConfigError::invalid_value(key, format!("需要正整数: {}", raw))),
            },
        }
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 获取全部 global 配置的快照 (JSON 对象,按 key 排序)
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = lock(&self.conn)?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置 (覆盖同名 key)
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }

        tx.commit()?;
        tracing::info!("配置快照已恢复: count={}", count);
        Ok(count)
    }
}

fn lock(conn: &Arc<Mutex<Connection>>) -> ConfigResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| ConfigError::LockError(e.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 引擎
    pub const DEFAULT_AGGREGATION_RULE: &str = "engine.default_aggregation_rule";
    pub const DEFAULT_PROPAGATION_RULE: &str = "engine.default_propagation_rule";
    pub const DEFAULT_THRESHOLDS: &str = "engine.default_thresholds"; // JSON 数组
    pub const EARLY_STOP: &str = "engine.early_stop";

    // 轮询
    pub const POLL_INTERVAL_SECS: &str = "monitor.poll_interval_secs";
    pub const FETCH_TIMEOUT_MS: &str = "monitor.fetch_timeout_ms";
}

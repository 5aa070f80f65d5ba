// ==========================================
// 需求预测与自动调拨系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (scope_id + key → value)
// 缺失键回落到默认值
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::rebalance_config_trait::RebalanceConfigReader;
use crate::config::settings::RebalanceSettings;
use crate::db::{configure_sqlite_connection, open_in_memory_connection, open_sqlite_connection};
use crate::domain::types::SeasonalityProfile;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 配置键
pub mod config_keys {
    pub const HORIZON_DAYS: &str = "forecast.horizon_days";
    pub const MIN_HISTORY_DAYS: &str = "forecast.min_history_days";
    pub const WEEKLY_SEASONALITY: &str = "forecast.weekly_seasonality";
    pub const YEARLY_SEASONALITY: &str = "forecast.yearly_seasonality";
    pub const DAILY_SEASONALITY: &str = "forecast.daily_seasonality";
    pub const INTERVAL_WIDTH: &str = "forecast.interval_width";
    pub const FIT_TIMEOUT_MS: &str = "forecast.fit_timeout_ms";
    pub const MAX_PARALLELISM: &str = "forecast.max_parallelism";
    pub const GAP_WINDOW_DAYS: &str = "gap.window_days";
    pub const CLAMP_NEGATIVE_DEMAND: &str = "gap.clamp_negative_demand";
    pub const MIN_SURPLUS_THRESHOLD: &str = "transfer.min_surplus_threshold";

    pub const ALL: &[&str] = &[
        HORIZON_DAYS,
        MIN_HISTORY_DAYS,
        WEEKLY_SEASONALITY,
        YEARLY_SEASONALITY,
        DAILY_SEASONALITY,
        INTERVAL_WIDTH,
        FIT_TIMEOUT_MS,
        MAX_PARALLELISM,
        GAP_WINDOW_DAYS,
        CLAMP_NEGATIVE_DEMAND,
        MIN_SURPLUS_THRESHOLD,
    ];
}

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: RebalanceSettings,
}

impl ConfigManager {
    /// 打开配置库（不存在则创建，并初始化 config_kv 表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = open_sqlite_connection(&path.to_string_lossy())?;
        Self::with_connection(conn)
    }

    /// 内存配置库
    pub fn in_memory() -> ConfigResult<Self> {
        Self::with_connection(open_in_memory_connection()?)
    }

    /// 从已有连接创建（会再次应用统一 PRAGMA，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            Self::ensure_schema(&guard)?;
        }
        Ok(Self {
            conn,
            defaults: RebalanceSettings::default(),
        })
    }

    fn with_connection(conn: Connection) -> ConfigResult<Self> {
        Self::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            defaults: RebalanceSettings::default(),
        })
    }

    /// 创建 config_kv 表（幂等）
    pub fn ensure_schema(conn: &Connection) -> ConfigResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（覆盖已有值）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 删除配置覆写（恢复默认值）
    pub fn remove_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
        )?;
        Ok(affected > 0)
    }

    /// 获取所有覆写配置的快照（JSON）
    ///
    /// # 用途
    /// - 记录在运行报告中，保证结果可复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从快照恢复配置
    ///
    /// # 返回
    /// 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;
        for (key, value) in &config_map {
            self.set_config_value(key, value)?;
        }
        Ok(config_map.len())
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn get_parsed<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> ConfigResult<bool> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                message: "期望 true/false/1/0/yes/no".to_string(),
            }),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// RebalanceConfigReader trait 实现
// ==========================================
#[async_trait]
impl RebalanceConfigReader for ConfigManager {
    async fn get_horizon_days(&self) -> ConfigResult<usize> {
        self.get_parsed(config_keys::HORIZON_DAYS, self.defaults.horizon_days)
    }

    async fn get_min_history_days(&self) -> ConfigResult<usize> {
        self.get_parsed(config_keys::MIN_HISTORY_DAYS, self.defaults.min_history_days)
    }

    async fn get_seasonality(&self) -> ConfigResult<SeasonalityProfile> {
        let defaults = self.defaults.seasonality;
        Ok(SeasonalityProfile {
            weekly: self.get_bool(config_keys::WEEKLY_SEASONALITY, defaults.weekly)?,
            yearly: self.get_bool(config_keys::YEARLY_SEASONALITY, defaults.yearly)?,
            daily: self.get_bool(config_keys::DAILY_SEASONALITY, defaults.daily)?,
        })
    }

    async fn get_interval_width(&self) -> ConfigResult<f64> {
        self.get_parsed(config_keys::INTERVAL_WIDTH, self.defaults.interval_width)
    }

    async fn get_fit_timeout_ms(&self) -> ConfigResult<u64> {
        self.get_parsed(config_keys::FIT_TIMEOUT_MS, self.defaults.fit_timeout_ms)
    }

    async fn get_max_parallelism(&self) -> ConfigResult<usize> {
        self.get_parsed(config_keys::MAX_PARALLELISM, self.defaults.max_parallelism)
    }

    async fn get_gap_window_days(&self) -> ConfigResult<usize> {
        self.get_parsed(config_keys::GAP_WINDOW_DAYS, self.defaults.gap_window_days)
    }

    async fn get_clamp_negative_demand(&self) -> ConfigResult<bool> {
        self.get_bool(
            config_keys::CLAMP_NEGATIVE_DEMAND,
            self.defaults.clamp_negative_demand,
        )
    }

    async fn get_min_surplus_threshold(&self) -> ConfigResult<i64> {
        self.get_parsed(
            config_keys::MIN_SURPLUS_THRESHOLD,
            self.defaults.min_surplus_threshold,
        )
    }

    async fn config_snapshot(&self) -> ConfigResult<String> {
        self.get_config_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let manager = ConfigManager::in_memory().unwrap();
        let settings = RebalanceSettings::load(&manager).await.unwrap();
        assert_eq!(settings, RebalanceSettings::default());
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_config_value(config_keys::HORIZON_DAYS, "14").unwrap();
        manager.set_config_value(config_keys::YEARLY_SEASONALITY, "yes").unwrap();
        manager.set_config_value(config_keys::MIN_SURPLUS_THRESHOLD, "25").unwrap();

        let settings = RebalanceSettings::load(&manager).await.unwrap();
        assert_eq!(settings.horizon_days, 14);
        assert!(settings.seasonality.yearly);
        assert!(settings.seasonality.weekly);
        assert_eq!(settings.min_surplus_threshold, 25);

        assert!(manager.remove_config_value(config_keys::HORIZON_DAYS).unwrap());
        assert_eq!(manager.get_horizon_days().await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_shared_connection_sees_same_table() {
        let conn = Arc::new(Mutex::new(open_in_memory_connection().unwrap()));
        let writer = ConfigManager::from_connection(Arc::clone(&conn)).unwrap();
        writer.set_config_value(config_keys::GAP_WINDOW_DAYS, "9").unwrap();

        // 再次建表不覆盖已有数据
        let reader = ConfigManager::from_connection(conn).unwrap();
        assert_eq!(reader.get_gap_window_days().await.unwrap(), 9);
        assert_eq!(reader.config_snapshot().await.unwrap(), r#"{"gap.window_days":"9"}"#);
    }

    #[tokio::test]
    async fn test_invalid_value_is_reported() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_config_value(config_keys::GAP_WINDOW_DAYS, "seven").unwrap();

        let err = manager.get_gap_window_days().await.unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, config_keys::GAP_WINDOW_DAYS);
                assert_eq!(value, "seven");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let source = ConfigManager::in_memory().unwrap();
        source.set_config_value(config_keys::HORIZON_DAYS, "45").unwrap();
        source.set_config_value(config_keys::CLAMP_NEGATIVE_DEMAND, "true").unwrap();
        let snapshot = source.get_config_snapshot().unwrap();

        let target = ConfigManager::in_memory().unwrap();
        assert_eq!(target.restore_config_from_snapshot(&snapshot).unwrap(), 2);
        assert_eq!(
            target.get_config_value(config_keys::HORIZON_DAYS).unwrap(),
            Some("45".to_string())
        );
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.db");
        {
            let manager = ConfigManager::new(&path).unwrap();
            manager.set_config_value(config_keys::GAP_WINDOW_DAYS, "3").unwrap();
        }
        let reopened = ConfigManager::new(&path).unwrap();
        assert_eq!(
            reopened.get_config_value(config_keys::GAP_WINDOW_DAYS).unwrap(),
            Some("3".to_string())
        );
    }
}

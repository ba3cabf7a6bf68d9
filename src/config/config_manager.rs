// ==========================================
// 学校排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::scheduler_config_trait::{SchedulerConfig, SchedulerConfigReader};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取并解析数值配置；缺失或格式错误时回退默认值
    fn get_parsed_or_default<T: FromStr + Copy>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SchedulerConfigReader for ConfigManager {
    fn load_scheduler_config(&self) -> Result<SchedulerConfig, Box<dyn Error>> {
        let defaults = SchedulerConfig::default();

        let first_period = self.get_parsed_or_default(config_keys::FIRST_PERIOD, defaults.first_period)?;
        let last_period = self.get_parsed_or_default(config_keys::LAST_PERIOD, defaults.last_period)?;
        let max_consecutive_periods = self.get_parsed_or_default(
            config_keys::MAX_CONSECUTIVE_PERIODS,
            defaults.max_consecutive_periods,
        )?;
        let max_periods_per_class_per_day = self.get_parsed_or_default(
            config_keys::MAX_PERIODS_PER_CLASS_PER_DAY,
            defaults.max_periods_per_class_per_day,
        )?;
        let locale = self
            .get_config_value(config_keys::LOCALE)?
            .map(|s| s.trim().to_string())
            .filter(|s| s == "en" || s == "zh-CN")
            .unwrap_or(defaults.locale);

        // 窗口非法时整体回退默认窗口
        let (first_period, last_period) =
            if first_period == 0 || first_period > last_period || last_period > defaults.last_period {
                tracing::warn!(first_period, last_period, "可排课窗口配置非法，使用默认窗口");
                (defaults.first_period, defaults.last_period)
            } else {
                (first_period, last_period)
            };

        Ok(SchedulerConfig {
            first_period,
            last_period,
            max_consecutive_periods: max_consecutive_periods.max(1),
            max_periods_per_class_per_day: max_periods_per_class_per_day.max(1),
            locale,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 可排课窗口
    pub const FIRST_PERIOD: &str = "scheduler_first_period";
    pub const LAST_PERIOD: &str = "scheduler_last_period";

    // 教师负荷
    pub const MAX_CONSECUTIVE_PERIODS: &str = "scheduler_max_consecutive_periods";
    pub const MAX_PERIODS_PER_CLASS_PER_DAY: &str = "scheduler_max_periods_per_class_per_day";

    // 冲突信息语言
    pub const LOCALE: &str = "scheduler_locale";
}

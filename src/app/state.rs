// ==========================================
// 学校排课系统 - 应用状态
// ==========================================
// 职责: 打开数据库、建表、装配 TimetableApi
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::api::TimetableApi;
use crate::db::{init_schema, open_sqlite_connection};
use crate::perf::install_sqlite_tracing;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SCHOOL_TIMETABLE_DB_PATH";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课表生成 API
    pub timetable_api: Arc<TimetableApi>,
}

impl AppState {
    /// 打开（必要时创建）数据库并装配 API
    pub fn new(db_path: String) -> anyhow::Result<Self> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let mut conn = open_sqlite_connection(&db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        init_schema(&conn).context("数据库建表失败")?;
        install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        let timetable_api = TimetableApi::from_connection(conn)
            .map_err(|e| anyhow::anyhow!("无法创建TimetableApi: {}", e))?;

        Ok(Self {
            db_path,
            timetable_api: Arc::new(timetable_api),
        })
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 设置了 SCHOOL_TIMETABLE_DB_PATH 时使用该值
/// - 否则: 用户数据目录/school-timetable/school_timetable.db
/// - 取不到用户数据目录时: ./school_timetable.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./school_timetable.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("school-timetable");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("school_timetable.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_creates_schema() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);

        let conn = open_sqlite_connection(&db_path).unwrap();
        let version = crate::db::read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(crate::db::CURRENT_SCHEMA_VERSION));
    }
}

// ==========================================
// 学校排课系统 - 生成记录仓储
// ==========================================
// 红线: 只追加，不修改历史记录
// ==========================================

use crate::domain::generation_log::GenerationLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub struct GenerationLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GenerationLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一条生成记录
    pub fn insert(&self, log: &GenerationLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO generation_log (
                run_id, school_id, scope, incremental, success,
                lessons_created, conflict_count, conflicts_json, elapsed_ms, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            params![
                &log.run_id,
                &log.school_id,
                &log.scope,
                if log.incremental { 1 } else { 0 },
                if log.success { 1 } else { 0 },
                log.lessons_created as i64,
                log.conflict_count as i64,
                log.conflicts_json.as_ref().map(|v| v.to_string()),
                log.elapsed_ms as i64,
                log.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 查询学校最近的生成记录（新 → 旧）
    pub fn find_recent(&self, school_id: &str, limit: usize) -> RepositoryResult<Vec<GenerationLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT run_id, school_id, scope, incremental, success,
                      lessons_created, conflict_count, conflicts_json, elapsed_ms, created_at
               FROM generation_log
               WHERE school_id = ?1
               ORDER BY created_at DESC, rowid DESC
               LIMIT ?2"#,
        )?;

        let logs = stmt
            .query_map(params![school_id, limit as i64], |row| {
                let conflicts_raw: Option<String> = row.get(7)?;
                let created_raw: String = row.get(9)?;
                Ok(GenerationLog {
                    run_id: row.get(0)?,
                    school_id: row.get(1)?,
                    scope: row.get(2)?,
                    incremental: row.get::<_, i64>(3)? != 0,
                    success: row.get::<_, i64>(4)? != 0,
                    lessons_created: row.get::<_, i64>(5)?.max(0) as usize,
                    conflict_count: row.get::<_, i64>(6)?.max(0) as usize,
                    conflicts_json: conflicts_raw.and_then(|s| serde_json::from_str(&s).ok()),
                    elapsed_ms: row.get::<_, i64>(8)?.max(0) as u64,
                    created_at: NaiveDateTime::parse_from_str(&created_raw, DATETIME_FMT).map_err(
                        |e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)),
                    )?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }
}

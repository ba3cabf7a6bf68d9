// ==========================================
// 学校排课系统 - 学校基础数据仓储
// ==========================================
// 职责: 班级 / 教师 / 科目 / 模块的只读访问
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::school::{SchoolClass, Teacher};
use crate::domain::types::weekday_from_db_str;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// SchoolDirectoryRepository - 学校基础数据仓储
// ==========================================
pub struct SchoolDirectoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SchoolDirectoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 学校是否存在
    pub fn school_exists(&self, school_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM school WHERE id = ?1",
                params![school_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    /// 查询学校的全部班级
    pub fn find_classes(&self, school_id: &str) -> RepositoryResult<Vec<SchoolClass>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, school_id, name, level FROM school_class WHERE school_id = ?1 ORDER BY id",
        )?;

        let classes = stmt
            .query_map(params![school_id], |row| {
                Ok(SchoolClass {
                    id: row.get(0)?,
                    school_id: row.get(1)?,
                    name: row.get(2)?,
                    level: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(classes)
    }

    /// 查询学校的全部教师/培训师
    ///
    /// 不可用日期/节次以 JSON 数组存储；无法识别的星期会被忽略并告警
    pub fn find_teachers(&self, school_id: &str) -> RepositoryResult<Vec<Teacher>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, school_id, name, unavailable_days, unavailable_periods
               FROM app_user
               WHERE school_id = ?1
               ORDER BY id"#,
        )?;

        let rows = stmt
            .query_map(params![school_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut teachers = Vec::with_capacity(rows.len());
        for (id, school_id, name, days_json, periods_json) in rows {
            let day_names: Vec<String> = parse_json_array(days_json.as_deref())?;
            let mut unavailable_days = Vec::new();
            for raw in &day_names {
                match weekday_from_db_str(raw) {
                    Some(day) => unavailable_days.push(day),
                    None => tracing::warn!(teacher_id = %id, day = %raw, "无法识别的不可用日期"),
                }
            }
            let unavailable_periods: Vec<u8> = parse_json_array(periods_json.as_deref())?;

            teachers.push(Teacher {
                id,
                school_id,
                name,
                unavailable_days,
                unavailable_periods,
            });
        }

        Ok(teachers)
    }

    /// 科目 ID → 名称
    pub fn find_subject_names(&self, school_id: &str) -> RepositoryResult<HashMap<String, String>> {
        self.find_names("SELECT id, name FROM subject WHERE school_id = ?1", school_id)
    }

    /// 模块 ID → 名称
    pub fn find_module_names(&self, school_id: &str) -> RepositoryResult<HashMap<String, String>> {
        self.find_names("SELECT id, name FROM module WHERE school_id = ?1", school_id)
    }

    fn find_names(&self, sql: &str, school_id: &str) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let names = stmt
            .query_map(params![school_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(names)
    }
}

fn parse_json_array<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> RepositoryResult<Vec<T>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(serde_json::from_str(s)?),
        None => Ok(Vec::new()),
    }
}

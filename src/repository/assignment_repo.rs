// ==========================================
// 学校排课系统 - 任课分配数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑，排课引擎只读
// ==========================================

use crate::domain::assignment::{Assignment, TeacherSubjectAssignment, TrainerModuleAssignment};
use crate::domain::types::ModuleCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 每周节数上限（一周 7 天 × 24 小时）
const MAX_WEEKLY_PERIODS: u32 = 7 * 24;

// ==========================================
// AssignmentRepository - 任课分配仓储
// ==========================================
pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询学校的普通科目任课分配
    pub fn find_subject_assignments(
        &self,
        school_id: &str,
    ) -> RepositoryResult<Vec<TeacherSubjectAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, teacher_id, class_id, subject_id, periods_per_week
               FROM teacher_subject_assignment
               WHERE school_id = ?1
               ORDER BY id"#,
        )?;

        let rows = stmt
            .query_map(params![school_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, teacher_id, class_id, subject_id, periods)| {
                Ok(TeacherSubjectAssignment {
                    periods_per_week: weekly_periods("periods_per_week", &id, periods)?,
                    id,
                    teacher_id,
                    class_id,
                    subject_id,
                })
            })
            .collect()
    }

    /// 查询学校的 TSS 模块任课分配
    ///
    /// 未知类别不报错，category=None（排序优先级 4）
    pub fn find_module_assignments(
        &self,
        school_id: &str,
    ) -> RepositoryResult<Vec<TrainerModuleAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, trainer_id, class_id, module_id, total_hours, category
               FROM trainer_module_assignment
               WHERE school_id = ?1
               ORDER BY id"#,
        )?;

        let rows = stmt
            .query_map(params![school_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, trainer_id, class_id, module_id, hours, category_raw)| {
                let category = ModuleCategory::from_db_str(&category_raw);
                if category.is_none() {
                    tracing::warn!(assignment_id = %id, category = %category_raw, "未知模块类别");
                }
                Ok(TrainerModuleAssignment {
                    total_hours: weekly_periods("total_hours", &id, hours)?,
                    id,
                    trainer_id,
                    class_id,
                    module_id,
                    category,
                })
            })
            .collect()
    }

    /// 查询学校的全部任课分配（科目在前，模块在后）
    pub fn find_all(&self, school_id: &str) -> RepositoryResult<Vec<Assignment>> {
        let mut all: Vec<Assignment> = self
            .find_subject_assignments(school_id)?
            .into_iter()
            .map(Assignment::Subject)
            .collect();
        all.extend(
            self.find_module_assignments(school_id)?
                .into_iter()
                .map(Assignment::Module),
        );
        Ok(all)
    }
}

/// 每周节数须落在 0..=MAX_WEEKLY_PERIODS
fn weekly_periods(field: &str, id: &str, value: i64) -> RepositoryResult<u32> {
    match u32::try_from(value) {
        Ok(v) if v <= MAX_WEEKLY_PERIODS => Ok(v),
        _ => Err(RepositoryError::field(
            field,
            format!("assignment {} 的值非法: {}", id, value),
        )),
    }
}

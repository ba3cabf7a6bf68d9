// ==========================================
// 学校排课系统 - 已排课数据仓储
// ==========================================
// 红线: 删除旧课表与写入新课表必须在同一事务内完成，
//       中途失败时学校保留原课表
// ==========================================

use crate::domain::lesson::{GenerationScope, ScheduledLesson};
use crate::domain::types::{weekday_from_db_str, weekday_to_db_str};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ScheduledLessonRepository - 已排课仓储
// ==========================================
pub struct ScheduledLessonRepository {
    conn: Arc<Mutex<Connection>>,
}

struct ScheduledLessonRow {
    id: String,
    school_id: String,
    teacher_id: String,
    class_id: String,
    subject_id: Option<String>,
    module_id: Option<String>,
    time_slot_id: String,
    day: String,
    period: i64,
    created_at: String,
}

impl ScheduledLessonRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询学校的全部已排课
    ///
    /// 排序: 星期 → 节次 → 班级，保证输出稳定
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<ScheduledLesson>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, school_id, teacher_id, class_id, subject_id, module_id,
                      time_slot_id, day, period, created_at
               FROM scheduled_lesson
               WHERE school_id = ?1
               ORDER BY class_id, period, id"#,
        )?;

        let rows = stmt
            .query_map(params![school_id], |row| {
                Ok(ScheduledLessonRow {
                    id: row.get(0)?,
                    school_id: row.get(1)?,
                    teacher_id: row.get(2)?,
                    class_id: row.get(3)?,
                    subject_id: row.get(4)?,
                    module_id: row.get(5)?,
                    time_slot_id: row.get(6)?,
                    day: row.get(7)?,
                    period: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut lessons = rows
            .into_iter()
            .map(map_lesson_row)
            .collect::<RepositoryResult<Vec<_>>>()?;

        lessons.sort_by(|a, b| {
            a.day
                .num_days_from_monday()
                .cmp(&b.day.num_days_from_monday())
                .then(a.period.cmp(&b.period))
                .then(a.class_id.cmp(&b.class_id))
        });
        Ok(lessons)
    }

    /// 统计学校的已排课行数
    pub fn count_by_school(&self, school_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM scheduled_lesson WHERE school_id = ?1",
            params![school_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 替换范围内的课表（删除 + 批量插入，单事务）
    ///
    /// # 返回
    /// (删除行数, 插入行数)
    pub fn replace_scope(
        &self,
        school_id: &str,
        scope: &GenerationScope,
        lessons: &[ScheduledLesson],
    ) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let deleted = delete_scope_in(&tx, school_id, scope)?;
        let inserted = insert_in(&tx, lessons)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok((deleted, inserted))
    }

    /// 批量追加（增量排课，单事务）
    pub fn insert_batch(&self, lessons: &[ScheduledLesson]) -> RepositoryResult<usize> {
        if lessons.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let inserted = insert_in(&tx, lessons)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(inserted)
    }
}

fn delete_scope_in(
    tx: &Transaction<'_>,
    school_id: &str,
    scope: &GenerationScope,
) -> RepositoryResult<usize> {
    let deleted = match scope {
        GenerationScope::School => tx.execute(
            "DELETE FROM scheduled_lesson WHERE school_id = ?1",
            params![school_id],
        )?,
        GenerationScope::Class { class_id } => tx.execute(
            "DELETE FROM scheduled_lesson WHERE school_id = ?1 AND class_id = ?2",
            params![school_id, class_id],
        )?,
        GenerationScope::Teacher { teacher_id } => tx.execute(
            "DELETE FROM scheduled_lesson WHERE school_id = ?1 AND teacher_id = ?2",
            params![school_id, teacher_id],
        )?,
    };
    Ok(deleted)
}

fn insert_in(tx: &Transaction<'_>, lessons: &[ScheduledLesson]) -> RepositoryResult<usize> {
    let mut stmt = tx.prepare(
        r#"INSERT INTO scheduled_lesson (
                id, school_id, teacher_id, class_id, subject_id, module_id,
                time_slot_id, day, period, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )?;

    for lesson in lessons {
        stmt.execute(params![
            &lesson.id,
            &lesson.school_id,
            &lesson.teacher_id,
            &lesson.class_id,
            &lesson.subject_id,
            &lesson.module_id,
            &lesson.time_slot_id,
            weekday_to_db_str(lesson.day),
            lesson.period as i64,
            lesson.created_at.format(DATETIME_FMT).to_string(),
        ])?;
    }
    Ok(lessons.len())
}

fn map_lesson_row(row: ScheduledLessonRow) -> RepositoryResult<ScheduledLesson> {
    let day = weekday_from_db_str(&row.day)
        .ok_or_else(|| RepositoryError::field("day", format!("无法识别的星期: {}", row.day)))?;
    let period = u8::try_from(row.period)
        .map_err(|_| RepositoryError::field("period", format!("节次越界: {}", row.period)))?;
    let created_at = NaiveDateTime::parse_from_str(&row.created_at, DATETIME_FMT)
        .map_err(|e| RepositoryError::field("created_at", e.to_string()))?;

    Ok(ScheduledLesson {
        id: row.id,
        school_id: row.school_id,
        teacher_id: row.teacher_id,
        class_id: row.class_id,
        subject_id: row.subject_id,
        module_id: row.module_id,
        time_slot_id: row.time_slot_id,
        day,
        period,
        created_at,
    })
}

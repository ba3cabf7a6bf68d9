// ==========================================
// 学校排课系统 - 课时数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::time_slot::TimeSlot;
use crate::domain::types::{weekday_from_db_str, weekday_to_db_str, Session};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// TimeSlotRepository - 课时仓储
// ==========================================
pub struct TimeSlotRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 课时原始行（解析前）
struct TimeSlotRow {
    id: String,
    school_id: String,
    day: String,
    period: i64,
    is_break: bool,
    session: String,
    start_time: String,
    end_time: String,
    label: Option<String>,
}

impl TimeSlotRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询学校的全部有效课时
    ///
    /// # 返回
    /// 按 (星期, 节次, 开始时间) 排序的课时列表，含课间
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<TimeSlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, school_id, day, period, is_break, session, start_time, end_time, label
               FROM time_slot
               WHERE school_id = ?1 AND is_active = 1
               ORDER BY id"#,
        )?;

        let rows = stmt
            .query_map(params![school_id], |row| {
                Ok(TimeSlotRow {
                    id: row.get(0)?,
                    school_id: row.get(1)?,
                    day: row.get(2)?,
                    period: row.get(3)?,
                    is_break: row.get::<_, i64>(4)? != 0,
                    session: row.get(5)?,
                    start_time: row.get(6)?,
                    end_time: row.get(7)?,
                    label: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut slots = rows
            .into_iter()
            .map(map_time_slot_row)
            .collect::<RepositoryResult<Vec<_>>>()?;

        slots.sort_by(|a, b| {
            a.day
                .num_days_from_monday()
                .cmp(&b.day.num_days_from_monday())
                .then(a.start_time.cmp(&b.start_time))
                .then(a.period.cmp(&b.period))
        });
        Ok(slots)
    }

    /// 统计学校的有效课时数（含课间）
    pub fn count_by_school(&self, school_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM time_slot WHERE school_id = ?1 AND is_active = 1",
            params![school_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 批量插入课时（事务）
    pub fn insert_batch(&self, slots: &[TimeSlot]) -> RepositoryResult<usize> {
        if slots.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO time_slot (
                        id, school_id, day, period, is_break, session, start_time, end_time, label
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )?;

            for slot in slots {
                stmt.execute(params![
                    &slot.id,
                    &slot.school_id,
                    weekday_to_db_str(slot.day),
                    slot.period as i64,
                    if slot.is_break { 1 } else { 0 },
                    slot.session.to_string(),
                    slot.start_time.format("%H:%M").to_string(),
                    slot.end_time.format("%H:%M").to_string(),
                    &slot.label,
                ])?;
            }
        }
        tx.commit()?;
        Ok(slots.len())
    }
}

fn parse_time(field: &str, raw: &str) -> RepositoryResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
        .map_err(|e| RepositoryError::field(field, format!("{} ({})", raw, e)))
}

fn map_time_slot_row(row: TimeSlotRow) -> RepositoryResult<TimeSlot> {
    let day = weekday_from_db_str(&row.day)
        .ok_or_else(|| RepositoryError::field("day", format!("无法识别的星期: {}", row.day)))?;
    let period = u8::try_from(row.period)
        .map_err(|_| RepositoryError::field("period", format!("节次越界: {}", row.period)))?;

    Ok(TimeSlot {
        id: row.id,
        school_id: row.school_id,
        day,
        period,
        is_break: row.is_break,
        session: Session::from_db_str(&row.session),
        start_time: parse_time("start_time", &row.start_time)?,
        end_time: parse_time("end_time", &row.end_time)?,
        label: row.label,
    })
}

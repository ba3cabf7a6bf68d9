// ==========================================
// 学校排课系统 - 性能统计
// ==========================================
// 职责: API 操作耗时 + SQL 语句计数
// 开关: SCHOOL_TIMETABLE_PERF_SQL=1 强制开启 SQL 计数（Debug 默认开启）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on")
}

/// 安装 SQLite 语句 trace（用于 SQL 计数）
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var("SCHOOL_TIMETABLE_PERF_SQL") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        return;
    }

    conn.trace(Some(sql_trace_callback));
}

fn sql_trace_callback(_sql: &str) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if active {
        SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
    }
}

/// 性能统计 Guard：记录 elapsed_ms + SQL 语句数
///
/// 使用方式：
/// ```ignore
/// let _perf = school_timetable::perf::PerfGuard::new("generate_timetable", school_id);
/// ```
pub struct PerfGuard {
    op: &'static str,
    school_id: String,
    start: Instant,
    sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str, school_id: &str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let sql_start = SQL_COUNT.with(|c| c.get());
        Self {
            op,
            school_id: school_id.to_string(),
            start: Instant::now(),
            sql_start,
        }
    }

    /// 当前已耗时（毫秒）
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        let sql_count = SQL_COUNT.with(|c| c.get()).saturating_sub(self.sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            school_id = %self.school_id,
            elapsed_ms,
            sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

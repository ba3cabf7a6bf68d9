// ==========================================
// 学校排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等建表（管理端与测试共用同一份 schema）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建表语句（全部 IF NOT EXISTS，可重复执行）
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS school (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS school_class (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    name TEXT NOT NULL,
    level TEXT NOT NULL
);

-- 教师与培训师共用用户表
CREATE TABLE IF NOT EXISTS app_user (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'TEACHER',
    unavailable_days TEXT,     -- JSON: ["MONDAY", ...]
    unavailable_periods TEXT   -- JSON: [1, 10, ...]
);

CREATE TABLE IF NOT EXISTS subject (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS module (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS time_slot (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    day TEXT NOT NULL,
    period INTEGER NOT NULL,
    is_break INTEGER NOT NULL DEFAULT 0,
    session TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    label TEXT,
    is_active INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS idx_time_slot_school ON time_slot(school_id, day, period);

CREATE TABLE IF NOT EXISTS teacher_subject_assignment (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    teacher_id TEXT NOT NULL,
    class_id TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    periods_per_week INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tsa_school ON teacher_subject_assignment(school_id);

CREATE TABLE IF NOT EXISTS trainer_module_assignment (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    trainer_id TEXT NOT NULL,
    class_id TEXT NOT NULL,
    module_id TEXT NOT NULL,
    total_hours INTEGER NOT NULL,
    category TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tma_school ON trainer_module_assignment(school_id);

CREATE TABLE IF NOT EXISTS scheduled_lesson (
    id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    teacher_id TEXT NOT NULL,
    class_id TEXT NOT NULL,
    subject_id TEXT,
    module_id TEXT,
    time_slot_id TEXT NOT NULL,
    day TEXT NOT NULL,
    period INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scheduled_lesson_school ON scheduled_lesson(school_id);
CREATE INDEX IF NOT EXISTS idx_scheduled_lesson_class ON scheduled_lesson(school_id, class_id);
CREATE INDEX IF NOT EXISTS idx_scheduled_lesson_teacher ON scheduled_lesson(school_id, teacher_id);

CREATE TABLE IF NOT EXISTS generation_log (
    run_id TEXT PRIMARY KEY,
    school_id TEXT NOT NULL,
    scope TEXT NOT NULL,
    incremental INTEGER NOT NULL DEFAULT 0,
    success INTEGER NOT NULL,
    lessons_created INTEGER NOT NULL,
    conflict_count INTEGER NOT NULL,
    conflicts_json TEXT,
    elapsed_ms INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_generation_log_school ON generation_log(school_id, created_at);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

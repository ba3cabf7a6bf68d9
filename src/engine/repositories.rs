// ==========================================
// 学校排课系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合课表生成所需的所有 Repository
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    AssignmentRepository, GenerationLogRepository, ScheduledLessonRepository,
    SchoolDirectoryRepository, TimeSlotRepository,
};

/// 课表生成仓储集合
///
/// # 包含的仓储
/// - `time_slot_repo`: 课时
/// - `assignment_repo`: 任课分配
/// - `directory_repo`: 班级/教师/科目/模块
/// - `lesson_repo`: 已排课
/// - `log_repo`: 生成记录
#[derive(Clone)]
pub struct TimetableRepositories {
    pub time_slot_repo: Arc<TimeSlotRepository>,
    pub assignment_repo: Arc<AssignmentRepository>,
    pub directory_repo: Arc<SchoolDirectoryRepository>,
    pub lesson_repo: Arc<ScheduledLessonRepository>,
    pub log_repo: Arc<GenerationLogRepository>,
}

impl TimetableRepositories {
    /// 共享同一个连接创建全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            time_slot_repo: Arc::new(TimeSlotRepository::new(conn.clone())),
            assignment_repo: Arc::new(AssignmentRepository::new(conn.clone())),
            directory_repo: Arc::new(SchoolDirectoryRepository::new(conn.clone())),
            lesson_repo: Arc::new(ScheduledLessonRepository::new(conn.clone())),
            log_repo: Arc::new(GenerationLogRepository::new(conn)),
        }
    }
}

// 注: 聚合结构体的正确性由 tests/ 下的集成测试验证

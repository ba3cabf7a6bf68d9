// ==========================================
// 学校排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod assignment_repo;
pub mod error;
pub mod generation_log_repo;
pub mod scheduled_lesson_repo;
pub mod school_repo;
pub mod time_slot_repo;

// 重导出核心仓储
pub use assignment_repo::AssignmentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use generation_log_repo::GenerationLogRepository;
pub use scheduled_lesson_repo::ScheduledLessonRepository;
pub use school_repo::SchoolDirectoryRepository;
pub use time_slot_repo::TimeSlotRepository;

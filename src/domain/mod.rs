// ==========================================
// 学校排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod conflict;
pub mod generation_log;
pub mod lesson;
pub mod school;
pub mod time_slot;
pub mod types;

// 重导出核心类型
pub use assignment::{Assignment, TeacherSubjectAssignment, TrainerModuleAssignment};
pub use conflict::{Conflict, ConflictType};
pub use generation_log::GenerationLog;
pub use lesson::{GenerationScope, LessonBlock, LessonSubject, ScheduledLesson};
pub use school::{NameLookup, SchoolClass, Teacher};
pub use time_slot::TimeSlot;
pub use types::{LessonType, ModuleCategory, PreferredTime, Session};

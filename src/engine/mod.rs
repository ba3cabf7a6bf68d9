// ==========================================
// 学校排课系统 - 引擎层
// ==========================================
// 职责: 实现排课业务规则,不拼 SQL
// 流程: 加载 → 准备 → 排序 → 容量预检 → 落位 → 冲突报告
// ==========================================

pub mod assignment_loader;
pub mod auditor;
pub mod conflict_reporter;
pub mod lesson_preparer;
pub mod orchestrator;
pub mod priority;
pub mod repositories;
pub mod scheduler_state;
pub mod slot_allocator;
pub mod time_grid;

// 重导出核心引擎
pub use assignment_loader::{AssignmentLoader, LoadedSchool};
pub use auditor::{AuditViolation, TimetableAuditor};
pub use conflict_reporter::{CapacityOwner, ConflictReporter};
pub use lesson_preparer::LessonPreparer;
pub use orchestrator::{GenerationInput, GenerationOutcome, TimetableOrchestrator};
pub use priority::{teacher_scope_scores, PrioritySorter};
pub use repositories::TimetableRepositories;
pub use scheduler_state::SchedulerState;
pub use slot_allocator::{GreedySlotAllocator, SolveContext, TimetableSolver};
pub use time_grid::TimeGrid;

// ==========================================
// 学校排课系统 - API 层
// ==========================================
// 职责: 提供课表生成接口,供命令行与管理端调用
// ==========================================

pub mod error;
pub mod timetable_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use timetable_api::{GenerateOptions, GenerationResult, TimetableApi};

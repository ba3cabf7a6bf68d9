// ==========================================
// 学校排课系统 - 应用层
// ==========================================
// 职责: 装配数据库连接与 API 实例,供命令行入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};

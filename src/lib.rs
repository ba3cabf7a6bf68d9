// ==========================================
// 学校排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 周课表自动生成（贪心落位 + 冲突报告）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排课规则
pub mod engine;

// 配置层 - 排课参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 性能计时
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 生成入口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{LessonType, ModuleCategory, PreferredTime, Session};

// 领域实体
pub use domain::{
    Assignment, Conflict, ConflictType, GenerationLog, GenerationScope, LessonBlock,
    ScheduledLesson, SchoolClass, Teacher, TimeSlot,
};

// 引擎
pub use engine::{
    GreedySlotAllocator, LessonPreparer, PrioritySorter, TimetableAuditor, TimetableOrchestrator,
};

// API
pub use api::{GenerateOptions, GenerationResult, TimetableApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ==========================================
// 学校排课系统 - 生成记录领域模型
// ==========================================
// 用途: 审计追踪，每次生成一行（成功或失败）
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// GenerationLog - 生成记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationLog {
    pub run_id: String,
    pub school_id: String,
    pub scope: String,             // SCHOOL / CLASS:<id> / TEACHER:<id>
    pub incremental: bool,
    pub success: bool,
    pub lessons_created: usize,
    pub conflict_count: usize,
    pub conflicts_json: Option<JsonValue>,
    pub elapsed_ms: u64,
    pub created_at: NaiveDateTime,
}

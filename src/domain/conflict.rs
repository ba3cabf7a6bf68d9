// ==========================================
// 学校排课系统 - 冲突领域模型
// ==========================================
// 冲突以数据形式返回调用方，不落库、不带重试语义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 冲突类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Unassigned, // 课程块未能落位 / 生成失败
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::Unassigned => write!(f, "unassigned"),
        }
    }
}

// ==========================================
// Conflict - 冲突
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl Conflict {
    pub fn unassigned(message: String, suggestions: Vec<String>) -> Self {
        Self {
            conflict_type: ConflictType::Unassigned,
            message,
            suggestions,
        }
    }
}

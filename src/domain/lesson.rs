// ==========================================
// 学校排课系统 - 课程块与已排课领域模型
// ==========================================
// LessonBlock: 单次生成内的临时对象，不落库
// ScheduledLesson: 最终产物，每占用一节课一行
// ==========================================

use crate::domain::types::{LessonType, ModuleCategory, PreferredTime};
use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

// ==========================================
// LessonSubject - 科目或模块
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LessonSubject {
    Subject {
        subject_id: String,
    },
    Module {
        module_id: String,
        category: Option<ModuleCategory>,
    },
}

impl LessonSubject {
    pub fn category(&self) -> Option<ModuleCategory> {
        match self {
            LessonSubject::Subject { .. } => None,
            LessonSubject::Module { category, .. } => *category,
        }
    }

    /// 唯一键（区分科目与模块的 ID 空间）
    pub fn key(&self) -> String {
        match self {
            LessonSubject::Subject { subject_id } => format!("S:{}", subject_id),
            LessonSubject::Module { module_id, .. } => format!("M:{}", module_id),
        }
    }
}

// ==========================================
// LessonBlock - 可排课的原子课程块
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonBlock {
    // ===== 归属 =====
    pub assignment_id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub subject: LessonSubject,

    // ===== 块信息 =====
    pub block_size: u8,
    pub lesson_index: u32, // 从 1 开始
    pub total_lessons: u32,
    pub periods_per_week: u32,

    // ===== 优先级元数据 =====
    pub priority: u32,
    pub preferred_time: PreferredTime,
    pub lesson_type: LessonType,
    pub class_level: String,

    // ===== 冗余显示字段（冲突报告用）=====
    pub teacher_name: String,
    pub class_name: String,
    pub subject_name: String,
}

impl LessonBlock {
    pub fn category(&self) -> Option<ModuleCategory> {
        self.subject.category()
    }

    /// 复制一份并替换块大小（回退为单节时使用）
    pub fn with_block_size(&self, size: u8) -> Self {
        Self {
            block_size: size,
            ..self.clone()
        }
    }
}

// ==========================================
// ScheduledLesson - 已排课
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledLesson {
    pub id: String,
    pub school_id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub subject_id: Option<String>,
    pub module_id: Option<String>,
    pub time_slot_id: String,
    pub day: Weekday,
    pub period: u8,
    pub created_at: NaiveDateTime,
}

impl ScheduledLesson {
    /// 与 LessonSubject::key 口径一致
    pub fn subject_key(&self) -> String {
        match (&self.subject_id, &self.module_id) {
            (_, Some(module_id)) => format!("M:{}", module_id),
            (Some(subject_id), None) => format!("S:{}", subject_id),
            (None, None) => "S:".to_string(),
        }
    }
}

// ==========================================
// GenerationScope - 生成范围
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationScope {
    School,
    Class { class_id: String },
    Teacher { teacher_id: String },
}

impl GenerationScope {
    /// 已排课是否属于本范围
    pub fn contains(&self, lesson: &ScheduledLesson) -> bool {
        match self {
            GenerationScope::School => true,
            GenerationScope::Class { class_id } => &lesson.class_id == class_id,
            GenerationScope::Teacher { teacher_id } => &lesson.teacher_id == teacher_id,
        }
    }

    pub fn label(&self) -> String {
        match self {
            GenerationScope::School => "SCHOOL".to_string(),
            GenerationScope::Class { class_id } => format!("CLASS:{}", class_id),
            GenerationScope::Teacher { teacher_id } => format!("TEACHER:{}", teacher_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(teacher_id: &str, class_id: &str) -> ScheduledLesson {
        ScheduledLesson {
            id: "L1".to_string(),
            school_id: "S1".to_string(),
            teacher_id: teacher_id.to_string(),
            class_id: class_id.to_string(),
            subject_id: Some("MATH".to_string()),
            module_id: None,
            time_slot_id: "TS1".to_string(),
            day: Weekday::Mon,
            period: 1,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    #[test]
    fn test_scope_contains() {
        let l = lesson("T1", "C1");
        assert!(GenerationScope::School.contains(&l));
        assert!(GenerationScope::Class { class_id: "C1".to_string() }.contains(&l));
        assert!(!GenerationScope::Class { class_id: "C2".to_string() }.contains(&l));
        assert!(GenerationScope::Teacher { teacher_id: "T1".to_string() }.contains(&l));
    }

    #[test]
    fn test_subject_key_matches_lesson_subject() {
        let l = lesson("T1", "C1");
        let subject = LessonSubject::Subject {
            subject_id: "MATH".to_string(),
        };
        assert_eq!(l.subject_key(), subject.key());
    }
}

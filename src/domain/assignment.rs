// ==========================================
// 学校排课系统 - 任课分配领域模型
// ==========================================
// 职责: 教师-班级-科目 / 培训师-班级-模块 的每周课时需求
// 说明: 由管理端创建，排课引擎只读
// ==========================================

use crate::domain::lesson::LessonSubject;
use crate::domain::types::ModuleCategory;
use serde::{Deserialize, Serialize};

// ==========================================
// TeacherSubjectAssignment - 普通科目任课
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSubjectAssignment {
    pub id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub periods_per_week: u32,
}

// ==========================================
// TrainerModuleAssignment - TSS 模块任课
// ==========================================
// category 为 None 表示数据库中出现了未知类别（优先级 4）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerModuleAssignment {
    pub id: String,
    pub trainer_id: String,
    pub class_id: String,
    pub module_id: String,
    pub total_hours: u32,
    pub category: Option<ModuleCategory>,
}

// ==========================================
// Assignment - 统一的任课需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Assignment {
    Subject(TeacherSubjectAssignment),
    Module(TrainerModuleAssignment),
}

impl Assignment {
    pub fn id(&self) -> &str {
        match self {
            Assignment::Subject(a) => &a.id,
            Assignment::Module(a) => &a.id,
        }
    }

    pub fn teacher_id(&self) -> &str {
        match self {
            Assignment::Subject(a) => &a.teacher_id,
            Assignment::Module(a) => &a.trainer_id,
        }
    }

    pub fn class_id(&self) -> &str {
        match self {
            Assignment::Subject(a) => &a.class_id,
            Assignment::Module(a) => &a.class_id,
        }
    }

    /// 每周所需节数
    pub fn weekly_periods(&self) -> u32 {
        match self {
            Assignment::Subject(a) => a.periods_per_week,
            Assignment::Module(a) => a.total_hours,
        }
    }

    pub fn subject(&self) -> LessonSubject {
        match self {
            Assignment::Subject(a) => LessonSubject::Subject {
                subject_id: a.subject_id.clone(),
            },
            Assignment::Module(a) => LessonSubject::Module {
                module_id: a.module_id.clone(),
                category: a.category,
            },
        }
    }

    /// 复制一份并替换每周节数（增量排课时扣减已排部分）
    pub fn with_weekly_periods(&self, periods: u32) -> Self {
        match self {
            Assignment::Subject(a) => Assignment::Subject(TeacherSubjectAssignment {
                periods_per_week: periods,
                ..a.clone()
            }),
            Assignment::Module(a) => Assignment::Module(TrainerModuleAssignment {
                total_hours: periods,
                ..a.clone()
            }),
        }
    }
}

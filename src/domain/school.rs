// ==========================================
// 学校排课系统 - 学校基础数据领域模型
// ==========================================
// 职责: 班级、教师及名称查找表
// 说明: 基础数据由管理端维护，排课引擎只读
// ==========================================

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// SchoolClass - 班级
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: String,
    pub school_id: String,
    pub name: String,
    pub level: String, // 年级（如 P5 / S2 / L4）
}

// ==========================================
// Teacher - 教师/培训师
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub school_id: String,
    pub name: String,
    pub unavailable_days: Vec<Weekday>,
    pub unavailable_periods: Vec<u8>, // 每天均不可用的节次
}

impl Teacher {
    /// 教师在 (day, period) 是否可用
    pub fn is_available(&self, day: Weekday, period: u8) -> bool {
        !self.unavailable_days.contains(&day) && !self.unavailable_periods.contains(&period)
    }
}

// ==========================================
// NameLookup - 名称查找表
// ==========================================
// 每次生成只加载一次，供冲突报告使用，避免逐条回查
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    pub teachers: HashMap<String, String>,
    pub classes: HashMap<String, String>,
    pub subjects: HashMap<String, String>,
    pub modules: HashMap<String, String>,
}

impl NameLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teacher_name(&self, id: &str) -> String {
        lookup_or_id(&self.teachers, id)
    }

    pub fn class_name(&self, id: &str) -> String {
        lookup_or_id(&self.classes, id)
    }

    pub fn subject_name(&self, id: &str) -> String {
        lookup_or_id(&self.subjects, id)
    }

    pub fn module_name(&self, id: &str) -> String {
        lookup_or_id(&self.modules, id)
    }
}

fn lookup_or_id(map: &HashMap<String, String>, id: &str) -> String {
    map.get(id).cloned().unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_availability() {
        let teacher = Teacher {
            id: "T1".to_string(),
            school_id: "S1".to_string(),
            name: "Alice".to_string(),
            unavailable_days: vec![Weekday::Mon],
            unavailable_periods: vec![10],
        };
        assert!(!teacher.is_available(Weekday::Mon, 1));
        assert!(!teacher.is_available(Weekday::Tue, 10));
        assert!(teacher.is_available(Weekday::Tue, 9));
    }

    #[test]
    fn test_name_lookup_falls_back_to_id() {
        let mut names = NameLookup::new();
        names.teachers.insert("T1".to_string(), "Alice".to_string());
        assert_eq!(names.teacher_name("T1"), "Alice");
        assert_eq!(names.teacher_name("T404"), "T404");
    }
}

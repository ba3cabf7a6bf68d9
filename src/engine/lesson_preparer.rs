// ==========================================
// 学校排课系统 - 课程块准备引擎
// ==========================================
// 职责: 任课分配 → 原子课程块
// 输入: 任课分配 + 班级 + 名称查找表
// 输出: 扁平的课程块列表
// ==========================================
// 连堂规则: 普通科目与 SPECIFIC/GENERAL 模块按 2 节一块拆分，
//           最后一块取余数；COMPLEMENTARY 模块每小时一块
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::lesson::{LessonBlock, LessonSubject};
use crate::domain::school::{NameLookup, SchoolClass};
use crate::domain::types::{module_category_priority, LessonType, ModuleCategory, PreferredTime};
use std::collections::HashMap;

/// 连堂块大小
pub const DOUBLE_PERIOD: u8 = 2;

// ==========================================
// LessonPreparer - 课程块准备引擎
// ==========================================
pub struct LessonPreparer {
    // 无状态引擎
}

impl LessonPreparer {
    pub fn new() -> Self {
        Self {}
    }

    /// 将全部任课分配转换为课程块
    ///
    /// - 班级不存在的分配跳过并告警
    /// - 每周 0 节的分配不产生课程块
    /// - 无分配时返回空列表（不是错误）
    pub fn prepare(
        &self,
        assignments: &[Assignment],
        classes: &HashMap<String, SchoolClass>,
        names: &NameLookup,
    ) -> Vec<LessonBlock> {
        let mut blocks = Vec::new();

        for assignment in assignments {
            let class = match classes.get(assignment.class_id()) {
                Some(c) => c,
                None => {
                    tracing::warn!(
                        assignment_id = assignment.id(),
                        class_id = assignment.class_id(),
                        "班级不存在，跳过该任课分配"
                    );
                    continue;
                }
            };
            blocks.extend(self.prepare_assignment(assignment, class, names));
        }

        tracing::debug!(
            assignments = assignments.len(),
            blocks = blocks.len(),
            "课程块准备完成"
        );
        blocks
    }

    /// 单个任课分配 → 课程块
    pub fn prepare_assignment(
        &self,
        assignment: &Assignment,
        class: &SchoolClass,
        names: &NameLookup,
    ) -> Vec<LessonBlock> {
        let weekly = assignment.weekly_periods();
        let subject = assignment.subject();
        let category = subject.category();
        let lesson_type = LessonType::from_class_level(&class.level);

        let sizes = split_periods(weekly, uses_double_periods(&subject));
        let total_lessons = sizes.len() as u32;

        let priority = match lesson_type {
            LessonType::Tss => module_category_priority(category),
            LessonType::Primary | LessonType::Secondary => weekly,
        };

        let preferred_time = match (lesson_type, category) {
            (LessonType::Tss, Some(ModuleCategory::Specific | ModuleCategory::General)) => {
                PreferredTime::Morning
            }
            _ => PreferredTime::Any,
        };

        let subject_name = match &subject {
            LessonSubject::Subject { subject_id } => names.subject_name(subject_id),
            LessonSubject::Module { module_id, .. } => names.module_name(module_id),
        };
        let teacher_name = names.teacher_name(assignment.teacher_id());

        sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| LessonBlock {
                assignment_id: assignment.id().to_string(),
                teacher_id: assignment.teacher_id().to_string(),
                class_id: class.id.clone(),
                subject: subject.clone(),
                block_size: size,
                lesson_index: i as u32 + 1,
                total_lessons,
                periods_per_week: weekly,
                priority,
                preferred_time,
                lesson_type,
                class_level: class.level.clone(),
                teacher_name: teacher_name.clone(),
                class_name: class.name.clone(),
                subject_name: subject_name.clone(),
            })
            .collect()
    }
}

impl Default for LessonPreparer {
    fn default() -> Self {
        Self::new()
    }
}

/// 是否遵循连堂规则
///
/// 普通科目与未知类别模块按连堂处理
fn uses_double_periods(subject: &LessonSubject) -> bool {
    match subject {
        LessonSubject::Subject { .. } => true,
        LessonSubject::Module { category: None, .. } => true,
        LessonSubject::Module {
            category: Some(c), ..
        } => c.uses_double_periods(),
    }
}

/// 拆分每周节数
///
/// - 连堂: ceil(n/2) 块，除最后一块外均为 2，奇数时最后一块为 1
/// - 非连堂: n 块，每块 1
pub fn split_periods(total: u32, double: bool) -> Vec<u8> {
    if !double {
        return vec![1; total as usize];
    }

    let full = (total / DOUBLE_PERIOD as u32) as usize;
    let mut sizes = vec![DOUBLE_PERIOD; full];
    if total % DOUBLE_PERIOD as u32 == 1 {
        sizes.push(1);
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::{TeacherSubjectAssignment, TrainerModuleAssignment};

    fn class(id: &str, level: &str) -> SchoolClass {
        SchoolClass {
            id: id.to_string(),
            school_id: "S1".to_string(),
            name: format!("Class {}", id),
            level: level.to_string(),
        }
    }

    fn subject_assignment(periods: u32) -> Assignment {
        Assignment::Subject(TeacherSubjectAssignment {
            id: "A1".to_string(),
            teacher_id: "T1".to_string(),
            class_id: "C1".to_string(),
            subject_id: "MATH".to_string(),
            periods_per_week: periods,
        })
    }

    fn module_assignment(hours: u32, category: Option<ModuleCategory>) -> Assignment {
        Assignment::Module(TrainerModuleAssignment {
            id: "A2".to_string(),
            trainer_id: "T2".to_string(),
            class_id: "C1".to_string(),
            module_id: "MOD1".to_string(),
            total_hours: hours,
            category,
        })
    }

    #[test]
    fn test_split_periods_double_rule() {
        for n in 1..=9u32 {
            let sizes = split_periods(n, true);
            assert_eq!(sizes.len() as u32, (n + 1) / 2, "n={}", n);
            assert_eq!(sizes.iter().map(|&s| s as u32).sum::<u32>(), n);
            assert!(sizes.iter().all(|&s| s == 1 || s == 2));
            assert!(sizes.iter().filter(|&&s| s == 1).count() <= 1);
        }
        assert!(split_periods(0, true).is_empty());
    }

    #[test]
    fn test_complementary_one_block_per_hour() {
        let preparer = LessonPreparer::new();
        let blocks = preparer.prepare_assignment(
            &module_assignment(3, Some(ModuleCategory::Complementary)),
            &class("C1", "L4"),
            &NameLookup::new(),
        );
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.block_size == 1));
        assert!(blocks.iter().all(|b| b.priority == 3));
        assert!(blocks.iter().all(|b| b.preferred_time == PreferredTime::Any));
    }

    #[test]
    fn test_specific_module_prefers_morning() {
        let preparer = LessonPreparer::new();
        let blocks = preparer.prepare_assignment(
            &module_assignment(5, Some(ModuleCategory::Specific)),
            &class("C1", "L5"),
            &NameLookup::new(),
        );
        assert_eq!(blocks.iter().map(|b| b.block_size).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert!(blocks.iter().all(|b| b.lesson_type == LessonType::Tss));
        assert!(blocks.iter().all(|b| b.priority == 1));
        assert!(blocks.iter().all(|b| b.preferred_time == PreferredTime::Morning));
        assert_eq!(blocks[2].lesson_index, 3);
        assert_eq!(blocks[2].total_lessons, 3);
    }

    #[test]
    fn test_regular_subject_priority_is_weekly_periods() {
        let preparer = LessonPreparer::new();
        let mut names = NameLookup::new();
        names.subjects.insert("MATH".to_string(), "Mathematics".to_string());
        names.teachers.insert("T1".to_string(), "Alice".to_string());

        let blocks =
            preparer.prepare_assignment(&subject_assignment(4), &class("C1", "S2"), &names);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.priority == 4));
        assert!(blocks.iter().all(|b| b.lesson_type == LessonType::Secondary));
        assert_eq!(blocks[0].subject_name, "Mathematics");
        assert_eq!(blocks[0].teacher_name, "Alice");
    }

    #[test]
    fn test_unknown_category_uses_double_periods_and_priority_4() {
        let preparer = LessonPreparer::new();
        let blocks = preparer.prepare_assignment(
            &module_assignment(4, None),
            &class("C1", "L3"),
            &NameLookup::new(),
        );
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.priority == 4));
    }

    #[test]
    fn test_missing_class_is_skipped() {
        let preparer = LessonPreparer::new();
        let blocks = preparer.prepare(&[subject_assignment(2)], &HashMap::new(), &NameLookup::new());
        assert!(blocks.is_empty());
    }
}

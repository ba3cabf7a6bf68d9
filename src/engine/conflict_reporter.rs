// ==========================================
// 学校排课系统 - 冲突报告
// ==========================================
// 职责: 收集未能落位的课程块，生成可读信息与处理建议
// 说明: 文案按配置 locale 渲染，名称来自单次加载的查找表
// ==========================================

use crate::domain::conflict::Conflict;
use crate::domain::lesson::{LessonBlock, LessonSubject};
use crate::domain::school::NameLookup;
use crate::domain::types::ModuleCategory;
use crate::i18n::t_in;

const MODULE_SUGGESTIONS: &[&str] = &[
    "suggestion.add_time_slots",
    "suggestion.reduce_workload",
    "suggestion.check_availability",
    "suggestion.redistribute_scope",
    "suggestion.allow_single_periods",
];

const COMPLEMENTARY_SUGGESTIONS: &[&str] = &[
    "suggestion.fill_gap",
    "suggestion.reduce_workload",
    "suggestion.check_availability",
    "suggestion.add_time_slots",
];

const SUBJECT_SUGGESTIONS: &[&str] = &[
    "suggestion.add_time_slots",
    "suggestion.reduce_workload",
    "suggestion.check_availability",
    "suggestion.redistribute_scope",
];

/// 课时不足的归属方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityOwner {
    Class(String),
    Teacher(String),
}

// ==========================================
// ConflictReporter - 冲突报告
// ==========================================
#[derive(Debug, Clone)]
pub struct ConflictReporter {
    locale: String,
    names: NameLookup,
    conflicts: Vec<Conflict>,
}

impl ConflictReporter {
    pub fn new(locale: &str, names: NameLookup) -> Self {
        Self {
            locale: locale.to_string(),
            names,
            conflicts: Vec::new(),
        }
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn into_conflicts(self) -> Vec<Conflict> {
        self.conflicts
    }

    /// 记录未落位课程块
    pub fn report_unassigned(&mut self, block: &LessonBlock) {
        let conflict = self.unassigned(block);
        tracing::warn!(
            teacher_id = %block.teacher_id,
            class_id = %block.class_id,
            subject = %block.subject.key(),
            block_size = block.block_size,
            lesson_index = block.lesson_index,
            "课程块未能落位"
        );
        self.conflicts.push(conflict);
    }

    // ==========================================
    // 冲突构造
    // ==========================================

    /// 未落位冲突，文案随类别区分
    pub fn unassigned(&self, block: &LessonBlock) -> Conflict {
        let index = block.lesson_index.to_string();
        let total = block.total_lessons.to_string();
        let size = block.block_size.to_string();
        let base = [
            ("subject", block.subject_name.as_str()),
            ("class", block.class_name.as_str()),
            ("teacher", block.teacher_name.as_str()),
            ("index", index.as_str()),
            ("total", total.as_str()),
            ("size", size.as_str()),
        ];

        let (message, suggestion_keys): (String, &[&str]) = match &block.subject {
            LessonSubject::Module {
                category: Some(ModuleCategory::Complementary),
                ..
            } => (
                t_in(&self.locale, "conflict.unassigned_complementary", &base),
                COMPLEMENTARY_SUGGESTIONS,
            ),
            LessonSubject::Module { category, .. } => {
                let category_str = category.map(|c| c.to_db_str()).unwrap_or("UNKNOWN");
                let mut args = base.to_vec();
                args.push(("category", category_str));
                (
                    t_in(&self.locale, "conflict.unassigned_module", &args),
                    MODULE_SUGGESTIONS,
                )
            }
            LessonSubject::Subject { .. } => (
                t_in(&self.locale, "conflict.unassigned_subject", &base),
                SUBJECT_SUGGESTIONS,
            ),
        };

        let suggestions = suggestion_keys
            .iter()
            .map(|key| t_in(&self.locale, key, &base))
            .collect();
        Conflict::unassigned(message, suggestions)
    }

    /// 学校无任何有效课时
    pub fn no_time_slots(&self, required: u64) -> Conflict {
        let required = required.to_string();
        Conflict::unassigned(
            t_in(
                &self.locale,
                "conflict.no_time_slots",
                &[("required", required.as_str())],
            ),
            vec![
                t_in(&self.locale, "suggestion.add_time_slots", &[]),
                t_in(&self.locale, "suggestion.reduce_required_periods", &[]),
            ],
        )
    }

    /// 需求节数超过有效课时数
    pub fn capacity_shortfall(&self, owner: &CapacityOwner, required: u64, available: usize) -> Conflict {
        let owner_text = match owner {
            CapacityOwner::Class(id) => t_in(
                &self.locale,
                "conflict.owner_class",
                &[("name", self.names.class_name(id).as_str())],
            ),
            CapacityOwner::Teacher(id) => t_in(
                &self.locale,
                "conflict.owner_teacher",
                &[("name", self.names.teacher_name(id).as_str())],
            ),
        };
        let required = required.to_string();
        let available = available.to_string();
        Conflict::unassigned(
            t_in(
                &self.locale,
                "conflict.capacity_shortfall",
                &[
                    ("owner", owner_text.as_str()),
                    ("required", required.as_str()),
                    ("available", available.as_str()),
                ],
            ),
            vec![
                t_in(&self.locale, "suggestion.add_time_slots", &[]),
                t_in(&self.locale, "suggestion.reduce_required_periods", &[]),
            ],
        )
    }

    /// 范围内无课程可排
    pub fn no_lessons(&self, scope_label: &str) -> Conflict {
        Conflict::unassigned(
            t_in(&self.locale, "conflict.no_lessons", &[("scope", scope_label)]),
            vec![t_in(&self.locale, "suggestion.add_assignments", &[])],
        )
    }

    /// 内部错误（不暴露底层错误类型）
    pub fn internal_error(&self, detail: &str) -> Conflict {
        Conflict::unassigned(
            t_in(&self.locale, "conflict.internal_error", &[("detail", detail)]),
            vec![t_in(&self.locale, "suggestion.contact_support", &[])],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conflict::ConflictType;
    use crate::domain::types::{LessonType, PreferredTime};

    fn block(subject: LessonSubject, size: u8) -> LessonBlock {
        LessonBlock {
            assignment_id: "A1".to_string(),
            teacher_id: "T1".to_string(),
            class_id: "C1".to_string(),
            subject,
            block_size: size,
            lesson_index: 2,
            total_lessons: 3,
            periods_per_week: 5,
            priority: 1,
            preferred_time: PreferredTime::Any,
            lesson_type: LessonType::Tss,
            class_level: "L4".to_string(),
            teacher_name: "Alice".to_string(),
            class_name: "L4 Software".to_string(),
            subject_name: "Networking".to_string(),
        }
    }

    #[test]
    fn test_specific_module_message() {
        let reporter = ConflictReporter::new("en", NameLookup::new());
        let conflict = reporter.unassigned(&block(
            LessonSubject::Module {
                module_id: "M1".to_string(),
                category: Some(ModuleCategory::Specific),
            },
            2,
        ));
        assert_eq!(conflict.conflict_type, ConflictType::Unassigned);
        assert!(conflict.message.contains("SPECIFIC"));
        assert!(conflict.message.contains("requires 2 consecutive periods"));
        assert!(conflict.message.contains("block 2 of 3"));
        assert!(conflict.suggestions.iter().any(|s| s.contains("Alice")));
        assert!(!conflict.message.contains("%{"));
    }

    #[test]
    fn test_complementary_message() {
        let reporter = ConflictReporter::new("en", NameLookup::new());
        let conflict = reporter.unassigned(&block(
            LessonSubject::Module {
                module_id: "M2".to_string(),
                category: Some(ModuleCategory::Complementary),
            },
            1,
        ));
        assert!(conflict.message.contains("fills remaining free spaces"));
        assert!(conflict.suggestions[0].contains("L4 Software"));
    }

    #[test]
    fn test_subject_message() {
        let mut reporter = ConflictReporter::new("en", NameLookup::new());
        reporter.report_unassigned(&block(
            LessonSubject::Subject {
                subject_id: "MATH".to_string(),
            },
            2,
        ));
        assert_eq!(reporter.conflicts().len(), 1);
        assert!(reporter.conflicts()[0]
            .message
            .contains("2 consecutive periods required"));
    }

    #[test]
    fn test_capacity_shortfall_uses_names() {
        let mut names = NameLookup::new();
        names.classes.insert("C1".to_string(), "S2 Blue".to_string());
        let reporter = ConflictReporter::new("en", names);
        let conflict =
            reporter.capacity_shortfall(&CapacityOwner::Class("C1".to_string()), 60, 50);
        assert!(conflict.message.contains("class S2 Blue"));
        assert!(conflict.message.contains("60"));
        assert!(conflict.message.contains("50"));
    }

    #[test]
    fn test_zh_cn_locale() {
        let reporter = ConflictReporter::new("zh-CN", NameLookup::new());
        let conflict = reporter.no_time_slots(4);
        assert!(conflict.message.contains("有效课时"));
        assert!(conflict.message.contains('4'));
    }
}

// ==========================================
// 学校排课系统 - 课程块排序引擎
// ==========================================
// 职责: 贪心落位前的课程块全序排序
// 输入: 课程块列表 + 教师覆盖面得分
// 输出: 排序后的课程块列表（先排的先落位）
// ==========================================
// 红线: 排序必须完全确定，同输入两次运行输出一致
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::lesson::{LessonBlock, LessonSubject};
use crate::domain::school::SchoolClass;
use crate::domain::types::{module_category_priority, LessonType, ModuleCategory};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// 覆盖面权重
const SCOPE_WEIGHT_CLASS: u32 = 3;
const SCOPE_WEIGHT_SUBJECT: u32 = 2;
const SCOPE_WEIGHT_LEVEL: u32 = 1;

/// 计算每位教师的覆盖面得分
///
/// 得分 = 不同班级数×3 + 不同科目/模块数×2 + 不同年级数×1
///
/// 应传入全校任课分配，范围排课时也一样
pub fn teacher_scope_scores(
    assignments: &[Assignment],
    classes: &HashMap<String, SchoolClass>,
) -> HashMap<String, u32> {
    #[derive(Default)]
    struct Scope<'a> {
        classes: HashSet<&'a str>,
        subjects: HashSet<String>,
        levels: HashSet<&'a str>,
    }

    let mut scopes: HashMap<&str, Scope> = HashMap::new();
    for assignment in assignments {
        let scope = scopes.entry(assignment.teacher_id()).or_default();
        scope.classes.insert(assignment.class_id());
        scope.subjects.insert(assignment.subject().key());
        if let Some(class) = classes.get(assignment.class_id()) {
            scope.levels.insert(class.level.as_str());
        }
    }

    scopes
        .into_iter()
        .map(|(teacher_id, s)| {
            let score = s.classes.len() as u32 * SCOPE_WEIGHT_CLASS
                + s.subjects.len() as u32 * SCOPE_WEIGHT_SUBJECT
                + s.levels.len() as u32 * SCOPE_WEIGHT_LEVEL;
            (teacher_id.to_string(), score)
        })
        .collect()
}

// ==========================================
// PrioritySorter - 课程块排序引擎
// ==========================================
pub struct PrioritySorter {
    // 无状态引擎,不需要注入依赖
}

impl PrioritySorter {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序课程块
    ///
    /// 排序键:
    /// 1) 教师覆盖面得分降序
    /// 2) 类别层级: SPECIFIC < GENERAL < 数学/物理 < 其他科目 < COMPLEMENTARY
    /// 3) 课程类型: TSS > SECONDARY > PRIMARY
    /// 4) TSS 内: 类别优先级升序，再按块数降序
    /// 5) 其他: 块数降序
    /// 6) 稳定收尾: 教师 → 班级 → 科目键 → 块序号
    pub fn sort(
        &self,
        mut blocks: Vec<LessonBlock>,
        scope_scores: &HashMap<String, u32>,
    ) -> Vec<LessonBlock> {
        blocks.sort_by(|a, b| self.compare(a, b, scope_scores));
        blocks
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// Ordering::Less 表示 a 先于 b 落位
    fn compare(
        &self,
        a: &LessonBlock,
        b: &LessonBlock,
        scope_scores: &HashMap<String, u32>,
    ) -> Ordering {
        // 1. 覆盖面得分（降序）
        let score_a = scope_scores.get(&a.teacher_id).copied().unwrap_or(0);
        let score_b = scope_scores.get(&b.teacher_id).copied().unwrap_or(0);
        match score_b.cmp(&score_a) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 类别层级
        match category_tier(a).cmp(&category_tier(b)) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. 课程类型
        match a.lesson_type.sort_rank().cmp(&b.lesson_type.sort_rank()) {
            Ordering::Equal => {}
            other => return other,
        }

        // 4/5. 类别优先级 + 块数
        let by_load = if a.lesson_type == LessonType::Tss {
            module_category_priority(a.category())
                .cmp(&module_category_priority(b.category()))
                .then(b.total_lessons.cmp(&a.total_lessons))
        } else {
            b.total_lessons.cmp(&a.total_lessons)
        };
        if by_load != Ordering::Equal {
            return by_load;
        }

        // 6. 确定性收尾
        a.teacher_id
            .cmp(&b.teacher_id)
            .then_with(|| a.class_id.cmp(&b.class_id))
            .then_with(|| a.subject.key().cmp(&b.subject.key()))
            .then(a.lesson_index.cmp(&b.lesson_index))
    }
}

impl Default for PrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}

/// 类别层级（越小越先排）
///
/// 数学/物理按科目名称子串匹配，大小写不敏感；"Physical Education" 不算物理
fn category_tier(block: &LessonBlock) -> u8 {
    match &block.subject {
        LessonSubject::Module { category, .. } => match category {
            Some(ModuleCategory::Specific) => 0,
            Some(ModuleCategory::General) => 1,
            Some(ModuleCategory::Complementary) => 4,
            None => 3,
        },
        LessonSubject::Subject { .. } => {
            let name = block.subject_name.to_lowercase();
            if name.contains("math") || name.contains("physics") {
                2
            } else {
                3
            }
        }
    }
}

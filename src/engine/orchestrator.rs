// ==========================================
// 学校排课系统 - 引擎编排器
// ==========================================
// 用途: 协调 准备 → 排序 → 容量预检 → 落位 的执行顺序
// 红线: 编排器不读写数据库，输入输出都是内存数据
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::assignment::Assignment;
use crate::domain::conflict::Conflict;
use crate::domain::lesson::{GenerationScope, ScheduledLesson};
use crate::domain::time_slot::TimeSlot;
use crate::engine::assignment_loader::LoadedSchool;
use crate::engine::conflict_reporter::{CapacityOwner, ConflictReporter};
use crate::engine::lesson_preparer::LessonPreparer;
use crate::engine::priority::{teacher_scope_scores, PrioritySorter};
use crate::engine::scheduler_state::SchedulerState;
use crate::engine::slot_allocator::{GreedySlotAllocator, SolveContext, TimetableSolver};
use crate::engine::time_grid::TimeGrid;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

// ==========================================
// GenerationInput - 单次生成输入
// ==========================================
pub struct GenerationInput<'a> {
    pub school_id: &'a str,
    pub scope: &'a GenerationScope,
    pub school: &'a LoadedSchool,
    pub slots: &'a [TimeSlot],
    /// 保留的已排课（作为背景占用）
    pub background: &'a [ScheduledLesson],
    /// 增量模式下范围内已有的课，用于扣减需求；非增量为空
    pub existing_in_scope: &'a [ScheduledLesson],
    pub created_at: NaiveDateTime,
}

// ==========================================
// GenerationOutcome - 单次生成结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    /// false 表示致命失败（无课时 / 容量不足 / 无课程），不应落库
    pub success: bool,
    pub lessons: Vec<ScheduledLesson>,
    pub conflicts: Vec<Conflict>,
    pub blocks_count: usize,
}

impl GenerationOutcome {
    fn fatal(conflict: Conflict) -> Self {
        Self {
            success: false,
            conflicts: vec![conflict],
            ..Default::default()
        }
    }
}

// ==========================================
// TimetableOrchestrator - 引擎编排器
// ==========================================
pub struct TimetableOrchestrator<S>
where
    S: TimetableSolver,
{
    config: SchedulerConfig,
    preparer: LessonPreparer,
    sorter: PrioritySorter,
    solver: S,
}

impl TimetableOrchestrator<GreedySlotAllocator> {
    /// 使用贪心落位引擎
    pub fn greedy(config: SchedulerConfig) -> Self {
        Self::new(config, GreedySlotAllocator::new())
    }
}

impl<S> TimetableOrchestrator<S>
where
    S: TimetableSolver,
{
    pub fn new(config: SchedulerConfig, solver: S) -> Self {
        Self {
            config,
            preparer: LessonPreparer::new(),
            sorter: PrioritySorter::new(),
            solver,
        }
    }

    /// 执行一次生成
    pub fn run(&self, input: &GenerationInput<'_>) -> GenerationOutcome {
        let mut reporter = ConflictReporter::new(&self.config.locale, input.school.names.clone());
        let scope_label = input.scope.label();

        info!(
            school_id = input.school_id,
            scope = %scope_label,
            background = input.background.len(),
            existing_in_scope = input.existing_in_scope.len(),
            "开始生成课表"
        );

        // ==========================================
        // 步骤1: 范围内任课分配
        // ==========================================
        let scoped = input.school.scoped_assignments(input.scope);
        let demand: u64 = scoped.iter().map(|a| a.weekly_periods() as u64).sum();
        if demand == 0 {
            warn!(school_id = input.school_id, scope = %scope_label, "范围内无课程可排");
            return GenerationOutcome::fatal(reporter.no_lessons(&self.scope_display(input)));
        }

        let remaining = remaining_demand(&scoped, input.existing_in_scope);
        if remaining.is_empty() {
            info!(school_id = input.school_id, scope = %scope_label, "增量生成: 范围已排满");
            return GenerationOutcome {
                success: true,
                ..Default::default()
            };
        }

        // ==========================================
        // 步骤2: 容量预检（按周需求，先于拆块）
        // ==========================================
        let grid = TimeGrid::from_slots(input.slots, &self.config);
        if let Some(conflict) =
            self.capacity_precheck(&remaining, input.background, &grid, &reporter)
        {
            warn!(school_id = input.school_id, message = %conflict.message, "容量预检未通过");
            return GenerationOutcome::fatal(conflict);
        }

        // ==========================================
        // 步骤3: 课程块准备
        // ==========================================
        let blocks = self
            .preparer
            .prepare(&remaining, &input.school.classes, &input.school.names);
        if blocks.is_empty() {
            return GenerationOutcome::fatal(reporter.no_lessons(&self.scope_display(input)));
        }
        debug!(blocks = blocks.len(), "步骤3: 课程块准备完成");

        // ==========================================
        // 步骤4: 排序（覆盖面按全校分配计算）
        // ==========================================
        let scores = teacher_scope_scores(&input.school.assignments, &input.school.classes);
        let blocks = self.sorter.sort(blocks, &scores);
        debug!("步骤4: 课程块排序完成");

        // ==========================================
        // 步骤5: 落位
        // ==========================================
        let mut state = SchedulerState::from_lessons(input.background);
        let ctx = SolveContext {
            school_id: input.school_id,
            grid: &grid,
            teachers: &input.school.teachers,
            config: &self.config,
            created_at: input.created_at,
        };
        let lessons = self.solver.solve(&blocks, &ctx, &mut state, &mut reporter);

        let conflicts = reporter.into_conflicts();
        info!(
            school_id = input.school_id,
            scope = %scope_label,
            blocks = blocks.len(),
            lessons = lessons.len(),
            conflicts = conflicts.len(),
            "课表生成完成"
        );

        GenerationOutcome {
            success: true,
            lessons,
            conflicts,
            blocks_count: blocks.len(),
        }
    }

    /// 容量预检
    ///
    /// 拆块前按周需求计算，块大小之和恒等于周节数；需求以 u64 累加
    ///
    /// - 无有效课时: 单条冲突
    /// - 任一班级/教师的需求（待排 + 背景占用）超过有效课时数: 单条冲突，指向需求最大者
    fn capacity_precheck(
        &self,
        remaining: &[Assignment],
        background: &[ScheduledLesson],
        grid: &TimeGrid,
        reporter: &ConflictReporter,
    ) -> Option<Conflict> {
        let required: u64 = remaining.iter().map(|a| a.weekly_periods() as u64).sum();
        let available = grid.valid_slot_count();
        if available == 0 {
            return Some(reporter.no_time_slots(required));
        }

        let mut class_demand: BTreeMap<&str, u64> = BTreeMap::new();
        let mut teacher_demand: BTreeMap<&str, u64> = BTreeMap::new();
        for assignment in remaining {
            let weekly = assignment.weekly_periods() as u64;
            *class_demand.entry(assignment.class_id()).or_insert(0) += weekly;
            *teacher_demand.entry(assignment.teacher_id()).or_insert(0) += weekly;
        }
        for lesson in background {
            if !grid.is_schedulable(lesson.day, lesson.period) {
                continue;
            }
            if let Some(d) = class_demand.get_mut(lesson.class_id.as_str()) {
                *d += 1;
            }
            if let Some(d) = teacher_demand.get_mut(lesson.teacher_id.as_str()) {
                *d += 1;
            }
        }

        // 班级优先，同值取 id 较小者
        let worst_class = max_entry(&class_demand);
        let worst_teacher = max_entry(&teacher_demand);
        let worst = match (worst_class, worst_teacher) {
            (Some((c, cd)), Some((t, td))) => {
                if td > cd {
                    (CapacityOwner::Teacher(t.to_string()), td)
                } else {
                    (CapacityOwner::Class(c.to_string()), cd)
                }
            }
            (Some((c, cd)), None) => (CapacityOwner::Class(c.to_string()), cd),
            (None, Some((t, td))) => (CapacityOwner::Teacher(t.to_string()), td),
            (None, None) => return None,
        };

        if worst.1 > available as u64 {
            return Some(reporter.capacity_shortfall(&worst.0, worst.1, available));
        }
        None
    }

    fn scope_display(&self, input: &GenerationInput<'_>) -> String {
        let names = &input.school.names;
        match input.scope {
            GenerationScope::School => input.school_id.to_string(),
            GenerationScope::Class { class_id } => names.class_name(class_id),
            GenerationScope::Teacher { teacher_id } => names.teacher_name(teacher_id),
        }
    }
}

/// 需求最大的归属方（同值保留 id 较小者）
fn max_entry<'a>(demand: &BTreeMap<&'a str, u64>) -> Option<(&'a str, u64)> {
    let mut best: Option<(&'a str, u64)> = None;
    for (id, value) in demand {
        match best {
            Some((_, v)) if *value <= v => {}
            _ => best = Some((*id, *value)),
        }
    }
    best
}

/// 扣减已排节数后的剩余需求
///
/// 已排课按 (教师, 班级, 科目键) 计数，依次抵扣同键分配
fn remaining_demand(scoped: &[Assignment], existing: &[ScheduledLesson]) -> Vec<Assignment> {
    if existing.is_empty() {
        return scoped
            .iter()
            .filter(|a| a.weekly_periods() > 0)
            .cloned()
            .collect();
    }

    let mut persisted: HashMap<(String, String, String), u32> = HashMap::new();
    for lesson in existing {
        *persisted
            .entry((
                lesson.teacher_id.clone(),
                lesson.class_id.clone(),
                lesson.subject_key(),
            ))
            .or_insert(0) += 1;
    }

    let mut remaining = Vec::new();
    for assignment in scoped {
        let key = (
            assignment.teacher_id().to_string(),
            assignment.class_id().to_string(),
            assignment.subject().key(),
        );
        let weekly = assignment.weekly_periods();
        let covered = persisted
            .get_mut(&key)
            .map(|count| {
                let used = (*count).min(weekly);
                *count -= used;
                used
            })
            .unwrap_or(0);
        if weekly > covered {
            remaining.push(assignment.with_weekly_periods(weekly - covered));
        }
    }
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::{TeacherSubjectAssignment, TrainerModuleAssignment};
    use crate::domain::school::{SchoolClass, Teacher};
    use crate::domain::types::ModuleCategory;
    use chrono::Weekday;

    fn school(assignments: Vec<Assignment>) -> LoadedSchool {
        let mut loaded = LoadedSchool {
            assignments,
            ..Default::default()
        };
        for (id, level) in [("C1", "S2"), ("C2", "L4")] {
            loaded
                .names
                .classes
                .insert(id.to_string(), format!("Class {}", id));
            loaded.classes.insert(
                id.to_string(),
                SchoolClass {
                    id: id.to_string(),
                    school_id: "S1".to_string(),
                    name: format!("Class {}", id),
                    level: level.to_string(),
                },
            );
        }
        for id in ["T1", "T2"] {
            loaded
                .names
                .teachers
                .insert(id.to_string(), format!("Teacher {}", id));
            loaded.teachers.insert(
                id.to_string(),
                Teacher {
                    id: id.to_string(),
                    school_id: "S1".to_string(),
                    name: format!("Teacher {}", id),
                    unavailable_days: vec![],
                    unavailable_periods: vec![],
                },
            );
        }
        loaded
    }

    fn subject(id: &str, teacher: &str, class: &str, periods: u32) -> Assignment {
        Assignment::Subject(TeacherSubjectAssignment {
            id: id.to_string(),
            teacher_id: teacher.to_string(),
            class_id: class.to_string(),
            subject_id: "MATH".to_string(),
            periods_per_week: periods,
        })
    }

    fn run(
        school: &LoadedSchool,
        scope: &GenerationScope,
        slots: &[TimeSlot],
        background: &[ScheduledLesson],
        existing: &[ScheduledLesson],
    ) -> GenerationOutcome {
        TimetableOrchestrator::greedy(SchedulerConfig::default()).run(&GenerationInput {
            school_id: "S1",
            scope,
            school,
            slots,
            background,
            existing_in_scope: existing,
            created_at: chrono::Local::now().naive_local(),
        })
    }

    #[test]
    fn test_basic_generation() {
        let school = school(vec![subject("A1", "T1", "C1", 4)]);
        let outcome = run(
            &school,
            &GenerationScope::School,
            &TimeGrid::standard_week("S1"),
            &[],
            &[],
        );
        assert!(outcome.success);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.blocks_count, 2);
        assert_eq!(outcome.lessons.len(), 4);
    }

    #[test]
    fn test_no_slots_is_fatal() {
        let school = school(vec![subject("A1", "T1", "C1", 4)]);
        let outcome = run(&school, &GenerationScope::School, &[], &[], &[]);
        assert!(!outcome.success);
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.lessons.is_empty());
    }

    #[test]
    fn test_capacity_shortfall_names_worst_owner() {
        // 单个班级 52 节 > 50 个有效课时
        let school = school(vec![
            subject("A1", "T1", "C1", 26),
            subject("A2", "T2", "C1", 26),
        ]);
        let outcome = run(
            &school,
            &GenerationScope::School,
            &TimeGrid::standard_week("S1"),
            &[],
            &[],
        );
        assert!(!outcome.success);
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.conflicts[0].message.contains("class Class C1"));
        assert!(outcome.conflicts[0].message.contains("52"));
    }

    #[test]
    fn test_huge_weekly_demand_is_rejected_before_splitting() {
        // 两项合计超过 u32 上限
        let school = school(vec![
            subject("A1", "T1", "C1", 3_000_000_000),
            subject("A2", "T2", "C1", 3_000_000_000),
        ]);
        let outcome = run(
            &school,
            &GenerationScope::School,
            &TimeGrid::standard_week("S1"),
            &[],
            &[],
        );
        assert!(!outcome.success);
        assert_eq!(outcome.blocks_count, 0);
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.conflicts[0].message.contains("6000000000"));
    }

    #[test]
    fn test_empty_scope_is_fatal() {
        let school = school(vec![subject("A1", "T1", "C1", 4)]);
        let outcome = run(
            &school,
            &GenerationScope::Class {
                class_id: "C2".to_string(),
            },
            &TimeGrid::standard_week("S1"),
            &[],
            &[],
        );
        assert!(!outcome.success);
        assert!(outcome.conflicts[0].message.contains("Class C2"));
    }

    #[test]
    fn test_remaining_demand_subtracts_persisted() {
        let assignments = vec![
            subject("A1", "T1", "C1", 4),
            Assignment::Module(TrainerModuleAssignment {
                id: "A2".to_string(),
                trainer_id: "T2".to_string(),
                class_id: "C2".to_string(),
                module_id: "MOD".to_string(),
                total_hours: 3,
                category: Some(ModuleCategory::Complementary),
            }),
        ];
        let lesson = |teacher: &str, class: &str, subject_id: Option<&str>, module_id: Option<&str>| {
            ScheduledLesson {
                id: "L".to_string(),
                school_id: "S1".to_string(),
                teacher_id: teacher.to_string(),
                class_id: class.to_string(),
                subject_id: subject_id.map(str::to_string),
                module_id: module_id.map(str::to_string),
                time_slot_id: "TS".to_string(),
                day: Weekday::Mon,
                period: 1,
                created_at: chrono::Local::now().naive_local(),
            }
        };
        let existing = vec![
            lesson("T1", "C1", Some("MATH"), None),
            lesson("T1", "C1", Some("MATH"), None),
            lesson("T2", "C2", None, Some("MOD")),
            lesson("T2", "C2", None, Some("MOD")),
            lesson("T2", "C2", None, Some("MOD")),
        ];

        let remaining = remaining_demand(&assignments, &existing);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), "A1");
        assert_eq!(remaining[0].weekly_periods(), 2);
    }

    #[test]
    fn test_fully_covered_incremental_succeeds_without_lessons() {
        let school = school(vec![subject("A1", "T1", "C1", 2)]);
        let first = run(
            &school,
            &GenerationScope::School,
            &TimeGrid::standard_week("S1"),
            &[],
            &[],
        );
        let scope = GenerationScope::Class {
            class_id: "C1".to_string(),
        };
        let outcome = run(
            &school,
            &scope,
            &TimeGrid::standard_week("S1"),
            &first.lessons,
            &first.lessons,
        );
        assert!(outcome.success);
        assert!(outcome.lessons.is_empty());
        assert!(outcome.conflicts.is_empty());
    }
}

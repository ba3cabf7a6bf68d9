// ==========================================
// 学校排课系统 - 课时落位引擎
// ==========================================
// 职责: 按排序顺序把课程块贪心放入一周课时格
// 输入: 排序后课程块 + 课时格 + 教师约束 + 占用状态
// 输出: 已排课列表（每节一行）+ 冲突
// ==========================================
// 红线: 单遍扫描，不回溯；一个块失败只记冲突，继续下一个块
// 红线: 落位必须同时满足 课时格 / 教师可用 / 教师空闲 / 班级空闲 /
//       连续节数上限 / 同班单日上限
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::lesson::{LessonBlock, LessonSubject, ScheduledLesson};
use crate::domain::school::Teacher;
use crate::domain::time_slot::TimeSlot;
use crate::domain::types::{weekday_to_db_str, ModuleCategory, PreferredTime, SCHOOL_DAYS};
use crate::engine::conflict_reporter::ConflictReporter;
use crate::engine::scheduler_state::SchedulerState;
use crate::engine::time_grid::TimeGrid;
use chrono::{NaiveDateTime, Weekday};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// SolveContext - 单次求解的只读上下文
// ==========================================
pub struct SolveContext<'a> {
    pub school_id: &'a str,
    pub grid: &'a TimeGrid,
    pub teachers: &'a HashMap<String, Teacher>,
    pub config: &'a SchedulerConfig,
    pub created_at: NaiveDateTime,
}

// ==========================================
// TimetableSolver - 求解器接口
// ==========================================
// 准备/排序/冲突报告与具体求解算法解耦
pub trait TimetableSolver {
    /// 放置全部课程块
    ///
    /// 未能落位的块写入 reporter，不返回错误
    fn solve(
        &self,
        blocks: &[LessonBlock],
        ctx: &SolveContext<'_>,
        state: &mut SchedulerState,
        reporter: &mut ConflictReporter,
    ) -> Vec<ScheduledLesson>;
}

// ==========================================
// GreedySlotAllocator - 贪心落位引擎
// ==========================================
pub struct GreedySlotAllocator {
    // 无状态引擎，占用状态由调用方持有
}

impl TimetableSolver for GreedySlotAllocator {
    #[instrument(skip(self, blocks, ctx, state, reporter), fields(
        school_id = %ctx.school_id,
        blocks_count = blocks.len()
    ))]
    fn solve(
        &self,
        blocks: &[LessonBlock],
        ctx: &SolveContext<'_>,
        state: &mut SchedulerState,
        reporter: &mut ConflictReporter,
    ) -> Vec<ScheduledLesson> {
        let mut lessons = Vec::new();
        for block in blocks {
            self.place_block(block, ctx, state, &mut lessons, reporter);
        }

        tracing::info!(
            lessons = lessons.len(),
            conflicts = reporter.conflicts().len(),
            "贪心落位完成"
        );
        lessons
    }
}

impl GreedySlotAllocator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 单块落位
    // ==========================================

    /// 放置单个课程块（含回退策略）
    ///
    /// - SPECIFIC/GENERAL: 先按准备好的块大小；失败则按单节回退，
    ///   回退成功后余下节数逐节补排，补排失败的部分单独记冲突
    /// - COMPLEMENTARY: 只按单节
    /// - 普通科目/未知类别: 严格按块大小，无回退
    pub fn place_block(
        &self,
        block: &LessonBlock,
        ctx: &SolveContext<'_>,
        state: &mut SchedulerState,
        lessons: &mut Vec<ScheduledLesson>,
        reporter: &mut ConflictReporter,
    ) {
        match block.category() {
            Some(ModuleCategory::Specific | ModuleCategory::General) => {
                if self.try_place(block, block.block_size, ctx, state, lessons) {
                    return;
                }
                if block.block_size > 1 {
                    let single = block.with_block_size(1);
                    if self.try_place(&single, 1, ctx, state, lessons) {
                        tracing::debug!(
                            teacher_id = %block.teacher_id,
                            class_id = %block.class_id,
                            lesson_index = block.lesson_index,
                            "连堂不可用，回退为单节"
                        );
                        for _ in 1..block.block_size {
                            if !self.try_place(&single, 1, ctx, state, lessons) {
                                reporter.report_unassigned(&single);
                            }
                        }
                        return;
                    }
                }
                reporter.report_unassigned(block);
            }
            Some(ModuleCategory::Complementary) => {
                let single = block.with_block_size(1);
                if !self.try_place(&single, 1, ctx, state, lessons) {
                    reporter.report_unassigned(&single);
                }
            }
            None => {
                if !self.try_place(block, block.block_size, ctx, state, lessons) {
                    reporter.report_unassigned(block);
                }
            }
        }
    }

    /// 在候选课时中寻找首个可行起点并提交
    fn try_place(
        &self,
        block: &LessonBlock,
        size: u8,
        ctx: &SolveContext<'_>,
        state: &mut SchedulerState,
        lessons: &mut Vec<ScheduledLesson>,
    ) -> bool {
        for slot in self.candidate_slots(block, ctx, state) {
            if self.can_place_block(
                &block.teacher_id,
                &block.class_id,
                slot.day,
                slot.period,
                size,
                ctx,
                state,
            ) {
                self.commit(block, slot.day, slot.period, size, ctx, state, lessons);
                return true;
            }
        }
        false
    }

    // ==========================================
    // 候选课时
    // ==========================================

    /// 候选起点课时
    ///
    /// 排序键: 当天负荷（教师+班级）升序 → 偏好上午时上午优先 → 星期 → 节次
    pub fn candidate_slots<'g>(
        &self,
        block: &LessonBlock,
        ctx: &SolveContext<'g>,
        state: &SchedulerState,
    ) -> Vec<&'g TimeSlot> {
        let mut loads = [0usize; 7];
        for day in SCHOOL_DAYS {
            loads[day.num_days_from_monday() as usize] =
                state.day_load(&block.teacher_id, &block.class_id, day);
        }
        let prefer_morning = block.preferred_time == PreferredTime::Morning;

        let grid = ctx.grid;
        let mut candidates: Vec<&'g TimeSlot> = grid
            .schedulable_slots()
            .into_iter()
            .filter(|s| grid.is_schedulable(s.day, s.period))
            .collect();

        candidates.sort_by_key(|s| {
            let day_index = s.day.num_days_from_monday() as usize;
            let morning_rank = u8::from(prefer_morning && !s.is_morning());
            (loads[day_index], morning_rank, day_index, s.period)
        });
        candidates
    }

    // ==========================================
    // 落位校验
    // ==========================================

    /// 从 (day, start) 起连续 size 节是否可放置
    #[allow(clippy::too_many_arguments)]
    pub fn can_place_block(
        &self,
        teacher_id: &str,
        class_id: &str,
        day: Weekday,
        start: u8,
        size: u8,
        ctx: &SolveContext<'_>,
        state: &SchedulerState,
    ) -> bool {
        if size == 0 || start == 0 {
            return false;
        }
        // 不得越过可排课窗口末节
        if start as u16 + size as u16 - 1 > ctx.grid.last_period() as u16 {
            return false;
        }

        let teacher = ctx.teachers.get(teacher_id);
        for offset in 0..size {
            let period = start + offset;
            if !ctx.grid.is_schedulable(day, period) {
                return false;
            }
            if let Some(t) = teacher {
                if !t.is_available(day, period) {
                    return false;
                }
            }
            if !state.is_teacher_free(teacher_id, day, period)
                || !state.is_class_free(class_id, day, period)
            {
                return false;
            }
        }

        self.can_schedule_consecutive(
            state,
            teacher_id,
            day,
            start,
            size,
            ctx.config.max_consecutive_periods,
        ) && self.is_workload_balanced(
            state,
            teacher_id,
            class_id,
            day,
            size,
            ctx.config.max_periods_per_class_per_day,
        )
    }

    /// 放置后教师当天的连续节数不超过上限
    ///
    /// 连续按节次编号计算，课间不打断连续
    pub fn can_schedule_consecutive(
        &self,
        state: &SchedulerState,
        teacher_id: &str,
        day: Weekday,
        start: u8,
        size: u8,
        max_run: u8,
    ) -> bool {
        if size == 0 {
            return true;
        }
        let busy = |p: u8| !state.is_teacher_free(teacher_id, day, p);

        let mut low = start;
        while low > 1 && busy(low - 1) {
            low -= 1;
        }
        let mut high = start + size - 1;
        while high < u8::MAX && busy(high + 1) {
            high += 1;
        }
        high - low + 1 <= max_run
    }

    /// 放置后教师当天给该班级的节数不超过上限
    pub fn is_workload_balanced(
        &self,
        state: &SchedulerState,
        teacher_id: &str,
        class_id: &str,
        day: Weekday,
        size: u8,
        max_per_day: u8,
    ) -> bool {
        state.teacher_class_periods_on(teacher_id, class_id, day) + size as u32
            <= max_per_day as u32
    }

    // ==========================================
    // 提交
    // ==========================================

    #[allow(clippy::too_many_arguments)]
    fn commit(
        &self,
        block: &LessonBlock,
        day: Weekday,
        start: u8,
        size: u8,
        ctx: &SolveContext<'_>,
        state: &mut SchedulerState,
        lessons: &mut Vec<ScheduledLesson>,
    ) {
        let (subject_id, module_id) = match &block.subject {
            LessonSubject::Subject { subject_id } => (Some(subject_id.clone()), None),
            LessonSubject::Module { module_id, .. } => (None, Some(module_id.clone())),
        };

        for offset in 0..size {
            let period = start + offset;
            let time_slot_id = match ctx.grid.slot(day, period) {
                Some(slot) => slot.id.clone(),
                None => continue,
            };
            state.occupy(&block.teacher_id, &block.class_id, day, period);
            lessons.push(ScheduledLesson {
                id: Uuid::new_v4().to_string(),
                school_id: ctx.school_id.to_string(),
                teacher_id: block.teacher_id.clone(),
                class_id: block.class_id.clone(),
                subject_id: subject_id.clone(),
                module_id: module_id.clone(),
                time_slot_id,
                day,
                period,
                created_at: ctx.created_at,
            });
        }

        tracing::debug!(
            teacher_id = %block.teacher_id,
            class_id = %block.class_id,
            subject = %block.subject.key(),
            day = weekday_to_db_str(day),
            start_period = start,
            size,
            "课程块已落位"
        );
    }
}

impl Default for GreedySlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 学校排课系统 - 排课占用状态
// ==========================================
// 职责: 单次生成内的教师/班级占用表
// 红线: 每次生成新建一份，不允许进程级共享
// ==========================================

use crate::domain::lesson::ScheduledLesson;
use chrono::Weekday;
use std::collections::{HashMap, HashSet};

type SlotKey = (Weekday, u8);

// ==========================================
// SchedulerState - 占用状态
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    teacher_occupied: HashMap<String, HashSet<SlotKey>>,
    class_occupied: HashMap<String, HashSet<SlotKey>>,
    // 教师 → 班级 → 每天节数（下标 = num_days_from_monday）
    teacher_class_daily: HashMap<String, HashMap<String, [u32; 7]>>,
}

impl SchedulerState {
    /// 空状态（全校重排）
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有课表为背景占用
    pub fn from_lessons<'a, I>(lessons: I) -> Self
    where
        I: IntoIterator<Item = &'a ScheduledLesson>,
    {
        let mut state = Self::new();
        for lesson in lessons {
            state.occupy(&lesson.teacher_id, &lesson.class_id, lesson.day, lesson.period);
        }
        state
    }

    /// 标记教师与班级在 (day, period) 占用
    pub fn occupy(&mut self, teacher_id: &str, class_id: &str, day: Weekday, period: u8) {
        let newly_taken = self
            .teacher_occupied
            .entry(teacher_id.to_string())
            .or_default()
            .insert((day, period));
        self.class_occupied
            .entry(class_id.to_string())
            .or_default()
            .insert((day, period));

        if newly_taken {
            let daily = self
                .teacher_class_daily
                .entry(teacher_id.to_string())
                .or_default()
                .entry(class_id.to_string())
                .or_insert([0; 7]);
            daily[day.num_days_from_monday() as usize] += 1;
        }
    }

    pub fn is_teacher_free(&self, teacher_id: &str, day: Weekday, period: u8) -> bool {
        !contains(&self.teacher_occupied, teacher_id, day, period)
    }

    pub fn is_class_free(&self, class_id: &str, day: Weekday, period: u8) -> bool {
        !contains(&self.class_occupied, class_id, day, period)
    }

    /// 教师当天已排节数
    pub fn teacher_periods_on(&self, teacher_id: &str, day: Weekday) -> usize {
        count_on(&self.teacher_occupied, teacher_id, day)
    }

    /// 班级当天已排节数
    pub fn class_periods_on(&self, class_id: &str, day: Weekday) -> usize {
        count_on(&self.class_occupied, class_id, day)
    }

    /// 教师当天给该班级的节数
    pub fn teacher_class_periods_on(&self, teacher_id: &str, class_id: &str, day: Weekday) -> u32 {
        self.teacher_class_daily
            .get(teacher_id)
            .and_then(|classes| classes.get(class_id))
            .map(|daily| daily[day.num_days_from_monday() as usize])
            .unwrap_or(0)
    }

    /// 当天负荷（教师 + 班级），用于均匀分布
    pub fn day_load(&self, teacher_id: &str, class_id: &str, day: Weekday) -> usize {
        self.teacher_periods_on(teacher_id, day) + self.class_periods_on(class_id, day)
    }
}

fn contains(map: &HashMap<String, HashSet<SlotKey>>, owner: &str, day: Weekday, period: u8) -> bool {
    map.get(owner)
        .map(|slots| slots.contains(&(day, period)))
        .unwrap_or(false)
}

fn count_on(map: &HashMap<String, HashSet<SlotKey>>, owner: &str, day: Weekday) -> usize {
    map.get(owner)
        .map(|slots| slots.iter().filter(|(d, _)| *d == day).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_and_counts() {
        let mut state = SchedulerState::new();
        state.occupy("T1", "C1", Weekday::Mon, 1);
        state.occupy("T1", "C1", Weekday::Mon, 2);
        state.occupy("T1", "C2", Weekday::Mon, 4);
        state.occupy("T2", "C1", Weekday::Tue, 1);

        assert!(!state.is_teacher_free("T1", Weekday::Mon, 1));
        assert!(state.is_teacher_free("T1", Weekday::Mon, 3));
        assert!(!state.is_class_free("C1", Weekday::Tue, 1));
        assert!(state.is_class_free("C9", Weekday::Tue, 1));

        assert_eq!(state.teacher_periods_on("T1", Weekday::Mon), 3);
        assert_eq!(state.teacher_class_periods_on("T1", "C1", Weekday::Mon), 2);
        assert_eq!(state.teacher_class_periods_on("T1", "C2", Weekday::Mon), 1);
        assert_eq!(state.day_load("T1", "C1", Weekday::Mon), 3 + 2);
    }

    #[test]
    fn test_duplicate_occupy_counts_once() {
        let mut state = SchedulerState::new();
        state.occupy("T1", "C1", Weekday::Wed, 5);
        state.occupy("T1", "C1", Weekday::Wed, 5);
        assert_eq!(state.teacher_class_periods_on("T1", "C1", Weekday::Wed), 1);
    }
}

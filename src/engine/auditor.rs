// ==========================================
// 学校排课系统 - 课表审计
// ==========================================
// 职责: 扫描已排课，检查硬约束是否被破坏
// 输出: 违规列表（空列表表示课表合法）
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::lesson::ScheduledLesson;
use crate::domain::types::{is_school_day, weekday_to_db_str};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// AuditViolation - 违规项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditViolation {
    /// 教师同一时刻出现在多个课堂
    TeacherDoubleBooked {
        teacher_id: String,
        day: String,
        period: u8,
        count: usize,
    },
    /// 班级同一时刻有多节课
    ClassDoubleBooked {
        class_id: String,
        day: String,
        period: u8,
        count: usize,
    },
    /// 教师连续节数超过上限
    ConsecutiveRunExceeded {
        teacher_id: String,
        day: String,
        start_period: u8,
        length: u8,
    },
    /// 教师单日对同一班级节数超过上限
    WorkloadExceeded {
        teacher_id: String,
        class_id: String,
        day: String,
        periods: usize,
    },
    /// 课程落在可排课窗口之外
    OutsideWindow {
        lesson_id: String,
        day: String,
        period: u8,
    },
}

// ==========================================
// TimetableAuditor - 课表审计
// ==========================================
pub struct TimetableAuditor {
    // 无状态引擎
}

impl TimetableAuditor {
    pub fn new() -> Self {
        Self {}
    }

    /// 审计课表
    ///
    /// 违规按 类型 → 归属 → 星期 → 节次 稳定排序
    pub fn audit(&self, lessons: &[ScheduledLesson], config: &SchedulerConfig) -> Vec<AuditViolation> {
        let mut violations = Vec::new();

        // 窗口
        for lesson in lessons {
            if !is_school_day(lesson.day)
                || lesson.period < config.first_period
                || lesson.period > config.last_period
            {
                violations.push(AuditViolation::OutsideWindow {
                    lesson_id: lesson.id.clone(),
                    day: weekday_to_db_str(lesson.day).to_string(),
                    period: lesson.period,
                });
            }
        }

        // 双重占用
        let mut teacher_slots: BTreeMap<(&str, u32, u8), usize> = BTreeMap::new();
        let mut class_slots: BTreeMap<(&str, u32, u8), usize> = BTreeMap::new();
        for lesson in lessons {
            let day = lesson.day.num_days_from_monday();
            *teacher_slots
                .entry((lesson.teacher_id.as_str(), day, lesson.period))
                .or_insert(0) += 1;
            *class_slots
                .entry((lesson.class_id.as_str(), day, lesson.period))
                .or_insert(0) += 1;
        }
        for ((teacher_id, day, period), count) in &teacher_slots {
            if *count > 1 {
                violations.push(AuditViolation::TeacherDoubleBooked {
                    teacher_id: teacher_id.to_string(),
                    day: day_name(*day),
                    period: *period,
                    count: *count,
                });
            }
        }
        for ((class_id, day, period), count) in &class_slots {
            if *count > 1 {
                violations.push(AuditViolation::ClassDoubleBooked {
                    class_id: class_id.to_string(),
                    day: day_name(*day),
                    period: *period,
                    count: *count,
                });
            }
        }

        // 连续节数
        let mut teacher_days: BTreeMap<(&str, u32), Vec<u8>> = BTreeMap::new();
        for (teacher_id, day, period) in teacher_slots.keys() {
            teacher_days.entry((*teacher_id, *day)).or_default().push(*period);
        }
        for ((teacher_id, day), periods) in &teacher_days {
            // BTreeMap 键有序，periods 已升序且去重
            for (start, length) in runs(periods) {
                if length > config.max_consecutive_periods {
                    violations.push(AuditViolation::ConsecutiveRunExceeded {
                        teacher_id: teacher_id.to_string(),
                        day: day_name(*day),
                        start_period: start,
                        length,
                    });
                }
            }
        }

        // 同班单日负荷
        let mut workload: BTreeMap<(&str, &str, u32), usize> = BTreeMap::new();
        for lesson in lessons {
            *workload
                .entry((
                    lesson.teacher_id.as_str(),
                    lesson.class_id.as_str(),
                    lesson.day.num_days_from_monday(),
                ))
                .or_insert(0) += 1;
        }
        for ((teacher_id, class_id, day), periods) in &workload {
            if *periods > config.max_periods_per_class_per_day as usize {
                violations.push(AuditViolation::WorkloadExceeded {
                    teacher_id: teacher_id.to_string(),
                    class_id: class_id.to_string(),
                    day: day_name(*day),
                    periods: *periods,
                });
            }
        }

        if !violations.is_empty() {
            tracing::warn!(violations = violations.len(), "课表审计发现违规");
        }
        violations
    }
}

impl Default for TimetableAuditor {
    fn default() -> Self {
        Self::new()
    }
}

/// 升序节次 → (起始节次, 长度) 连续段
fn runs(periods: &[u8]) -> Vec<(u8, u8)> {
    let mut result = Vec::new();
    let mut iter = periods.iter().copied();
    let Some(first) = iter.next() else {
        return result;
    };

    let (mut start, mut prev, mut length) = (first, first, 1u8);
    for p in iter {
        if p == prev.saturating_add(1) {
            length = length.saturating_add(1);
        } else {
            result.push((start, length));
            start = p;
            length = 1;
        }
        prev = p;
    }
    result.push((start, length));
    result
}

fn day_name(index: u32) -> String {
    let day = match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    };
    weekday_to_db_str(day).to_string()
}

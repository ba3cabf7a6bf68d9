// ==========================================
// 学校排课系统 - 课时格模型
// ==========================================
// 职责: 一周课时结构（星期 × 节次 × 课间）
// 红线: is_schedulable 是"可排课"的唯一判定来源，
//       候选过滤与落位校验两处都必须调用
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::time_slot::TimeSlot;
use crate::domain::types::{is_school_day, weekday_to_db_str, Session, SCHOOL_DAYS};
use chrono::{NaiveTime, Weekday};
use std::collections::HashMap;

// ==========================================
// TimeGrid - 课时格
// ==========================================
#[derive(Debug, Clone)]
pub struct TimeGrid {
    first_period: u8,
    last_period: u8,
    slots: HashMap<(Weekday, u8), TimeSlot>,
}

impl TimeGrid {
    /// 由学校课时列表构建课时格
    ///
    /// - period = 0 的课间行只用于展示，不进入索引
    /// - 同一 (day, period) 重复时保留 id 较小者并告警
    pub fn from_slots(slots: &[TimeSlot], config: &SchedulerConfig) -> Self {
        let mut sorted: Vec<&TimeSlot> = slots.iter().filter(|s| s.period >= 1).collect();
        sorted.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index: HashMap<(Weekday, u8), TimeSlot> = HashMap::new();
        for slot in sorted {
            let key = (slot.day, slot.period);
            if let Some(existing) = index.get(&key) {
                tracing::warn!(
                    day = weekday_to_db_str(slot.day),
                    period = slot.period,
                    kept = %existing.id,
                    ignored = %slot.id,
                    "重复课时，忽略"
                );
                continue;
            }
            index.insert(key, slot.clone());
        }

        Self {
            first_period: config.first_period,
            last_period: config.last_period,
            slots: index,
        }
    }

    pub fn last_period(&self) -> u8 {
        self.last_period
    }

    /// 查询 (day, period) 对应课时
    pub fn slot(&self, day: Weekday, period: u8) -> Option<&TimeSlot> {
        self.slots.get(&(day, period))
    }

    /// (day, period) 是否可排课
    ///
    /// 条件: 周一至周五 + 节次在窗口内 + 课时存在 + 非课间
    pub fn is_schedulable(&self, day: Weekday, period: u8) -> bool {
        if !is_school_day(day) {
            return false;
        }
        if period < self.first_period || period > self.last_period {
            return false;
        }
        match self.slot(day, period) {
            Some(slot) => !slot.is_break,
            None => false,
        }
    }

    /// 全部可排课课时，按 (星期, 节次) 排序
    pub fn schedulable_slots(&self) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self
            .slots
            .values()
            .filter(|s| self.is_schedulable(s.day, s.period))
            .collect();
        slots.sort_by(|a, b| {
            a.day
                .num_days_from_monday()
                .cmp(&b.day.num_days_from_monday())
                .then(a.period.cmp(&b.period))
        });
        slots
    }

    /// 可排课课时数
    pub fn valid_slot_count(&self) -> usize {
        self.schedulable_slots().len()
    }

    // ==========================================
    // 标准课时表
    // ==========================================

    /// 标准一周课时表
    ///
    /// 每天: 早会 07:40-08:00，P1-P10 08:00-16:50（每节 45 分钟），
    /// P3 后课间、P5 后午休、P8 后课间，晚间 P11-P13 不参与自动排课。
    /// 课间 period = 0。
    pub fn standard_week(school_id: &str) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        for day in SCHOOL_DAYS {
            for (period, session, start, end, label) in STANDARD_DAY {
                let day_str = weekday_to_db_str(day);
                let id = match label {
                    Some(l) => format!("{}-{}-{}", school_id, day_str, l.to_uppercase()),
                    None => format!("{}-{}-P{:02}", school_id, day_str, period),
                };
                slots.push(TimeSlot {
                    id,
                    school_id: school_id.to_string(),
                    day,
                    period: *period,
                    is_break: *session == Session::Break,
                    session: *session,
                    start_time: hm(*start),
                    end_time: hm(*end),
                    label: label.map(|l| l.to_string()),
                });
            }
        }
        slots
    }
}

type StandardSlot = (u8, Session, (u32, u32), (u32, u32), Option<&'static str>);

const STANDARD_DAY: &[StandardSlot] = &[
    (0, Session::Break, (7, 40), (8, 0), Some("Assembly")),
    (1, Session::Morning, (8, 0), (8, 45), None),
    (2, Session::Morning, (8, 45), (9, 30), None),
    (3, Session::Morning, (9, 30), (10, 15), None),
    (0, Session::Break, (10, 15), (10, 35), Some("Morning Break")),
    (4, Session::Morning, (10, 35), (11, 20), None),
    (5, Session::Morning, (11, 20), (12, 5), None),
    (0, Session::Break, (12, 5), (12, 45), Some("Lunch")),
    (6, Session::Afternoon, (12, 45), (13, 30), None),
    (7, Session::Afternoon, (13, 30), (14, 15), None),
    (8, Session::Afternoon, (14, 15), (15, 0), None),
    (0, Session::Break, (15, 0), (15, 20), Some("Afternoon Break")),
    (9, Session::Afternoon, (15, 20), (16, 5), None),
    (10, Session::Afternoon, (16, 5), (16, 50), None),
    (11, Session::Evening, (17, 0), (17, 45), None),
    (12, Session::Evening, (17, 45), (18, 30), None),
    (13, Session::Evening, (18, 30), (19, 15), None),
];

fn hm((h, m): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

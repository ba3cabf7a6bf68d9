// ==========================================
// 学校排课系统 - 课时格领域模型
// ==========================================
// 红线: 同一学校 (day, period) 只允许一个有效课时
// 红线: 只有周一至周五、第 1-10 节、非课间的课时可排课
// ==========================================

use crate::domain::types::Session;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

// ==========================================
// TimeSlot - 课时
// ==========================================
// 课间/午休等非教学时段 period = 0, is_break = true
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub school_id: String,
    pub day: Weekday,
    pub period: u8,
    pub is_break: bool,
    pub session: Session,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub label: Option<String>, // 显示名称（如 "Lunch"）
}

impl TimeSlot {
    /// 是否属于上午时段
    pub fn is_morning(&self) -> bool {
        self.session == Session::Morning
    }

    /// 时长（分钟）
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

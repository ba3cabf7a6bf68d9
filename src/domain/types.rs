// ==========================================
// 学校排课系统 - 领域类型定义
// ==========================================
// 职责: 排课引擎使用的封闭枚举类型
// 红线: 类别分支必须穷举匹配,不允许裸字符串比较
// ==========================================

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 时段类型 (Session)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Session {
    Morning,   // 上午
    Afternoon, // 下午
    Evening,   // 晚间（不参与自动排课）
    Break,     // 课间/午休
}

impl Session {
    pub fn from_db_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "MORNING" => Session::Morning,
            "AFTERNOON" => Session::Afternoon,
            "EVENING" => Session::Evening,
            _ => Session::Break,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Morning => write!(f, "MORNING"),
            Session::Afternoon => write!(f, "AFTERNOON"),
            Session::Evening => write!(f, "EVENING"),
            Session::Break => write!(f, "BREAK"),
        }
    }
}

// ==========================================
// 模块类别 (TSS Module Category)
// ==========================================
// 顺序: SPECIFIC < GENERAL < COMPLEMENTARY (数值越小越优先)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleCategory {
    Specific,      // 专业模块
    General,       // 通识模块
    Complementary, // 补充模块（填空）
}

impl ModuleCategory {
    /// 解析数据库中的类别字符串
    ///
    /// 未知类别返回 None，由调用方决定是否跳过
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SPECIFIC" => Some(ModuleCategory::Specific),
            "GENERAL" => Some(ModuleCategory::General),
            "COMPLEMENTARY" => Some(ModuleCategory::Complementary),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ModuleCategory::Specific => "SPECIFIC",
            ModuleCategory::General => "GENERAL",
            ModuleCategory::Complementary => "COMPLEMENTARY",
        }
    }

    /// 类别优先级数值（越小越优先）
    pub fn priority(&self) -> u32 {
        match self {
            ModuleCategory::Specific => 1,
            ModuleCategory::General => 2,
            ModuleCategory::Complementary => 3,
        }
    }

    /// 是否遵循连堂规则（两节一组）
    pub fn uses_double_periods(&self) -> bool {
        match self {
            ModuleCategory::Specific | ModuleCategory::General => true,
            ModuleCategory::Complementary => false,
        }
    }
}

/// 类别优先级（含未知类别）
///
/// SPECIFIC=1, GENERAL=2, COMPLEMENTARY=3, 未知=4
pub fn module_category_priority(category: Option<ModuleCategory>) -> u32 {
    category.map(|c| c.priority()).unwrap_or(4)
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 课程类型 (Lesson Type)
// ==========================================
// 由班级年级推导: L3/L4/L5 → TSS, S* → SECONDARY, P* → PRIMARY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonType {
    Primary,
    Secondary,
    Tss,
}

impl LessonType {
    /// 根据班级年级推导课程类型
    pub fn from_class_level(level: &str) -> Self {
        let level = level.trim().to_uppercase();
        match level.as_str() {
            "L3" | "L4" | "L5" => LessonType::Tss,
            l if l.starts_with('S') => LessonType::Secondary,
            l if l.starts_with('P') => LessonType::Primary,
            _ => LessonType::Secondary,
        }
    }

    /// 排序层级（越小越优先）: TSS > SECONDARY > PRIMARY
    pub fn sort_rank(&self) -> u8 {
        match self {
            LessonType::Tss => 0,
            LessonType::Secondary => 1,
            LessonType::Primary => 2,
        }
    }
}

impl fmt::Display for LessonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonType::Primary => write!(f, "PRIMARY"),
            LessonType::Secondary => write!(f, "SECONDARY"),
            LessonType::Tss => write!(f, "TSS"),
        }
    }
}

// ==========================================
// 偏好时段 (Preferred Time)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreferredTime {
    Morning,
    Any,
}

impl fmt::Display for PreferredTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferredTime::Morning => write!(f, "MORNING"),
            PreferredTime::Any => write!(f, "ANY"),
        }
    }
}

// ==========================================
// 星期 (数据库存储格式: MONDAY..SUNDAY)
// ==========================================

/// 星期 → 数据库字符串
pub fn weekday_to_db_str(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// 数据库字符串 → 星期（大小写不敏感，兼容缩写）
pub fn weekday_from_db_str(s: &str) -> Option<Weekday> {
    match s.trim().to_uppercase().as_str() {
        "MONDAY" | "MON" => Some(Weekday::Mon),
        "TUESDAY" | "TUE" => Some(Weekday::Tue),
        "WEDNESDAY" | "WED" => Some(Weekday::Wed),
        "THURSDAY" | "THU" => Some(Weekday::Thu),
        "FRIDAY" | "FRI" => Some(Weekday::Fri),
        "SATURDAY" | "SAT" => Some(Weekday::Sat),
        "SUNDAY" | "SUN" => Some(Weekday::Sun),
        _ => None,
    }
}

/// 是否为教学日（周一至周五）
pub fn is_school_day(day: Weekday) -> bool {
    day.num_days_from_monday() < 5
}

/// 周一至周五
pub const SCHOOL_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

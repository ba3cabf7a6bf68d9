// ==========================================
// 学校排课系统 - 排课配置读取 Trait
// ==========================================
// 职责: 定义排课引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// SchedulerConfig - 排课参数快照
// ==========================================
// 一次生成内只读取一次，整个流程使用同一份快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 可排课起始节次
    pub first_period: u8,
    /// 可排课结束节次（含）
    pub last_period: u8,
    /// 教师单日最多连续节数
    pub max_consecutive_periods: u8,
    /// 教师单日对同一班级最多节数
    pub max_periods_per_class_per_day: u8,
    /// 冲突信息语言（en / zh-CN）
    pub locale: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            first_period: 1,
            last_period: 10,
            max_consecutive_periods: 2,
            max_periods_per_class_per_day: 3,
            locale: "en".to_string(),
        }
    }
}

// ==========================================
// SchedulerConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）、SchedulerConfig（测试直接注入）
pub trait SchedulerConfigReader: Send + Sync {
    /// 读取排课参数
    ///
    /// # 默认值
    /// - first_period=1, last_period=10
    /// - max_consecutive_periods=2
    /// - max_periods_per_class_per_day=3
    /// - locale=en
    fn load_scheduler_config(&self) -> Result<SchedulerConfig, Box<dyn Error>>;
}

impl SchedulerConfigReader for SchedulerConfig {
    fn load_scheduler_config(&self) -> Result<SchedulerConfig, Box<dyn Error>> {
        Ok(self.clone())
    }
}

// ==========================================
// 学校排课系统 - 课表生成 API
// ==========================================
// 职责: 三个生成入口 + 审计 + 标准课时初始化
// 红线: 生成入口不返回 Err，所有失败都以冲突形式返回
// 红线: 同一学校的并发生成由调用方串行化
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, SchedulerConfig, SchedulerConfigReader};
use crate::domain::conflict::Conflict;
use crate::domain::generation_log::GenerationLog;
use crate::domain::lesson::{GenerationScope, ScheduledLesson};
use crate::domain::school::NameLookup;
use crate::engine::{
    AssignmentLoader, AuditViolation, ConflictReporter, GenerationInput, GenerationOutcome,
    TimeGrid, TimetableAuditor, TimetableOrchestrator, TimetableRepositories,
};
use crate::perf::PerfGuard;

// ==========================================
// 请求/响应类型
// ==========================================

/// 范围生成选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// 保留范围内已有课程，只补排缺口
    pub incremental: bool,
    /// 强制重排（优先于 incremental）
    pub regenerate: bool,
}

impl GenerateOptions {
    /// 是否保留范围内已有课程
    pub fn keeps_scope(&self) -> bool {
        self.incremental && !self.regenerate
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub conflicts: Vec<Conflict>,
    pub lessons_created: usize,
    pub run_id: String,
}

// ==========================================
// TimetableApi - 课表生成 API
// ==========================================
pub struct TimetableApi {
    repos: TimetableRepositories,
    loader: AssignmentLoader,
    config_reader: Arc<dyn SchedulerConfigReader>,
}

impl TimetableApi {
    pub fn new(repos: TimetableRepositories, config_reader: Arc<dyn SchedulerConfigReader>) -> Self {
        let loader = AssignmentLoader::new(repos.assignment_repo.clone(), repos.directory_repo.clone());
        Self {
            repos,
            loader,
            config_reader,
        }
    }

    /// 基于单个连接装配（配置从 config_kv 读取）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(Self::new(
            TimetableRepositories::from_connection(conn),
            Arc::new(config_manager),
        ))
    }

    // ==========================================
    // 生成入口
    // ==========================================

    /// 全校重排
    pub fn generate(&self, school_id: &str) -> GenerationResult {
        self.run_scope(
            "generate_timetable",
            school_id,
            GenerationScope::School,
            GenerateOptions::default(),
        )
    }

    /// 单个班级重排 / 增量补排
    pub fn generate_for_class(
        &self,
        school_id: &str,
        class_id: &str,
        options: GenerateOptions,
    ) -> GenerationResult {
        self.run_scope(
            "generate_timetable_for_class",
            school_id,
            GenerationScope::Class {
                class_id: class_id.to_string(),
            },
            options,
        )
    }

    /// 单个教师重排 / 增量补排
    pub fn generate_for_teacher(
        &self,
        school_id: &str,
        teacher_id: &str,
        options: GenerateOptions,
    ) -> GenerationResult {
        self.run_scope(
            "generate_timetable_for_teacher",
            school_id,
            GenerationScope::Teacher {
                teacher_id: teacher_id.to_string(),
            },
            options,
        )
    }

    // ==========================================
    // 辅助入口
    // ==========================================

    /// 审计学校当前课表
    pub fn audit_school(&self, school_id: &str) -> ApiResult<Vec<AuditViolation>> {
        let _perf = PerfGuard::new("audit_timetable", school_id);
        let config = self.load_config()?;
        let lessons = self.repos.lesson_repo.find_by_school(school_id)?;
        Ok(TimetableAuditor::new().audit(&lessons, &config))
    }

    /// 为尚无课时的学校写入标准一周课时表
    ///
    /// # 返回
    /// 写入的课时行数（已有课时时为 0）
    pub fn seed_standard_grid(&self, school_id: &str) -> ApiResult<usize> {
        self.ensure_school(school_id)?;
        let existing = self.repos.time_slot_repo.count_by_school(school_id)?;
        if existing > 0 {
            info!(school_id, existing, "学校已有课时，跳过标准课时初始化");
            return Ok(0);
        }

        let inserted = self
            .repos
            .time_slot_repo
            .insert_batch(&TimeGrid::standard_week(school_id))?;
        info!(school_id, inserted, "标准课时初始化完成");
        Ok(inserted)
    }

    /// 最近的生成记录
    pub fn recent_runs(&self, school_id: &str, limit: usize) -> ApiResult<Vec<GenerationLog>> {
        Ok(self.repos.log_repo.find_recent(school_id, limit)?)
    }

    // ==========================================
    // 内部流程
    // ==========================================

    fn run_scope(
        &self,
        op: &'static str,
        school_id: &str,
        scope: GenerationScope,
        options: GenerateOptions,
    ) -> GenerationResult {
        let perf = PerfGuard::new(op, school_id);
        let run_id = Uuid::new_v4().to_string();
        let created_at = chrono::Local::now().naive_local();

        let (success, lessons_created, conflicts) =
            match self.try_run(school_id, &scope, options, created_at) {
                Ok((outcome, persisted)) => (outcome.success, persisted, outcome.conflicts),
                Err(e) => {
                    error!(school_id, scope = %scope.label(), error = %e, "课表生成内部错误");
                    let locale = self
                        .config_reader
                        .load_scheduler_config()
                        .map(|c| c.locale)
                        .unwrap_or_else(|_| SchedulerConfig::default().locale);
                    let conflict = ConflictReporter::new(&locale, NameLookup::new())
                        .internal_error(&e.to_string());
                    (false, 0, vec![conflict])
                }
            };

        let log = GenerationLog {
            run_id: run_id.clone(),
            school_id: school_id.to_string(),
            scope: scope.label(),
            incremental: options.keeps_scope() && scope != GenerationScope::School,
            success,
            lessons_created,
            conflict_count: conflicts.len(),
            conflicts_json: serde_json::to_value(&conflicts).ok(),
            elapsed_ms: perf.elapsed_ms(),
            created_at,
        };
        if let Err(e) = self.repos.log_repo.insert(&log) {
            warn!(school_id, run_id = %run_id, error = %e, "生成记录写入失败");
        }

        GenerationResult {
            success,
            conflicts,
            lessons_created,
            run_id,
        }
    }

    /// # 返回
    /// (编排结果, 实际写入的课程行数)
    fn try_run(
        &self,
        school_id: &str,
        scope: &GenerationScope,
        options: GenerateOptions,
        created_at: NaiveDateTime,
    ) -> ApiResult<(GenerationOutcome, usize)> {
        self.ensure_school(school_id)?;
        let config = self.load_config()?;

        let slots = self.repos.time_slot_repo.find_by_school(school_id)?;
        let school = self.loader.load(school_id)?;
        let current = self.repos.lesson_repo.find_by_school(school_id)?;

        // 背景占用与增量扣减
        let keeps_scope = options.keeps_scope() && *scope != GenerationScope::School;
        let (background, existing_in_scope): (Vec<ScheduledLesson>, Vec<ScheduledLesson>) =
            if keeps_scope {
                let in_scope = current.iter().filter(|l| scope.contains(l)).cloned().collect();
                (current, in_scope)
            } else {
                let others = current.into_iter().filter(|l| !scope.contains(l)).collect();
                (others, Vec::new())
            };

        let orchestrator = TimetableOrchestrator::greedy(config);
        let outcome = orchestrator.run(&GenerationInput {
            school_id,
            scope,
            school: &school,
            slots: &slots,
            background: &background,
            existing_in_scope: &existing_in_scope,
            created_at,
        });

        if !outcome.success {
            return Ok((outcome, 0));
        }

        let persisted = if keeps_scope {
            self.repos.lesson_repo.insert_batch(&outcome.lessons)?
        } else {
            let (deleted, inserted) =
                self.repos
                    .lesson_repo
                    .replace_scope(school_id, scope, &outcome.lessons)?;
            info!(school_id, scope = %scope.label(), deleted, inserted, "课表已替换");
            inserted
        };
        Ok((outcome, persisted))
    }

    fn load_config(&self) -> ApiResult<SchedulerConfig> {
        self.config_reader
            .load_scheduler_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    fn ensure_school(&self, school_id: &str) -> ApiResult<()> {
        if self.repos.directory_repo.school_exists(school_id)? {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("school(id={})不存在", school_id)))
        }
    }
}

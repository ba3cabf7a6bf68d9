// ==========================================
// 学校排课系统 - 任课分配加载
// ==========================================
// 职责: 一次性读取生成所需的学校基础数据
// 输出: LoadedSchool（分配 + 班级 + 教师 + 名称查找表）
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::lesson::GenerationScope;
use crate::domain::school::{NameLookup, SchoolClass, Teacher};
use crate::repository::{AssignmentRepository, RepositoryResult, SchoolDirectoryRepository};
use std::collections::HashMap;
use std::sync::Arc;

// ==========================================
// LoadedSchool - 单次生成的学校快照
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LoadedSchool {
    /// 全校分配（已剔除班级不存在的记录）
    pub assignments: Vec<Assignment>,
    pub classes: HashMap<String, SchoolClass>,
    pub teachers: HashMap<String, Teacher>,
    pub names: NameLookup,
}

impl LoadedSchool {
    /// 范围内的任课分配
    pub fn scoped_assignments(&self, scope: &GenerationScope) -> Vec<Assignment> {
        self.assignments
            .iter()
            .filter(|a| match scope {
                GenerationScope::School => true,
                GenerationScope::Class { class_id } => a.class_id() == class_id,
                GenerationScope::Teacher { teacher_id } => a.teacher_id() == teacher_id,
            })
            .cloned()
            .collect()
    }
}

// ==========================================
// AssignmentLoader - 加载器
// ==========================================
pub struct AssignmentLoader {
    assignment_repo: Arc<AssignmentRepository>,
    directory_repo: Arc<SchoolDirectoryRepository>,
}

impl AssignmentLoader {
    pub fn new(
        assignment_repo: Arc<AssignmentRepository>,
        directory_repo: Arc<SchoolDirectoryRepository>,
    ) -> Self {
        Self {
            assignment_repo,
            directory_repo,
        }
    }

    /// 加载学校快照
    pub fn load(&self, school_id: &str) -> RepositoryResult<LoadedSchool> {
        let classes: HashMap<String, SchoolClass> = self
            .directory_repo
            .find_classes(school_id)?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let teachers: HashMap<String, Teacher> = self
            .directory_repo
            .find_teachers(school_id)?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let mut skipped = 0usize;
        let assignments: Vec<Assignment> = self
            .assignment_repo
            .find_all(school_id)?
            .into_iter()
            .filter(|a| {
                let known = classes.contains_key(a.class_id());
                if !known {
                    skipped += 1;
                    tracing::warn!(
                        school_id,
                        assignment_id = a.id(),
                        class_id = a.class_id(),
                        "任课分配引用的班级不存在，已跳过"
                    );
                }
                known
            })
            .collect();

        let names = NameLookup {
            teachers: teachers
                .values()
                .map(|t| (t.id.clone(), t.name.clone()))
                .collect(),
            classes: classes
                .values()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
            subjects: self.directory_repo.find_subject_names(school_id)?,
            modules: self.directory_repo.find_module_names(school_id)?,
        };

        tracing::info!(
            school_id,
            assignments = assignments.len(),
            skipped,
            classes = classes.len(),
            teachers = teachers.len(),
            "学校数据加载完成"
        );

        Ok(LoadedSchool {
            assignments,
            classes,
            teachers,
            names,
        })
    }
}

// ==========================================
// 范围生成集成测试
// ==========================================
// 职责: 验证班级/教师范围的重排与增量补排
// 场景: 范围外课表保持不变、已排满时零写入、补排新增分配、生成记录
// ==========================================


use school_timetable::api::{GenerateOptions, TimetableApi};
use school_timetable::db::open_sqlite_connection;
use school_timetable::domain::ScheduledLesson;
use school_timetable::repository::ScheduledLessonRepository;
use std::collections::BTreeSet;
use tempfile::NamedTempFile;
use test_helpers::*;

const INCREMENTAL: GenerateOptions = GenerateOptions {
    incremental: true,
    regenerate: false,
};

const REGENERATE: GenerateOptions = GenerateOptions {
    incremental: false,
    regenerate: true,
};

/// 两个班级、三名教师，已完成一次全校生成
fn setup_generated_school() -> (NamedTempFile, String, TimetableApi) {
    let (temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        insert_school(&conn, "S1", "Green Hills Secondary");
        insert_class(&conn, "S1", "C1", "Senior 1A", "S3");
        insert_class(&conn, "S1", "C2", "Senior 1B", "S3");
        insert_teacher(&conn, "S1", "T1", "Alice", &[], &[]);
        insert_teacher(&conn, "S1", "T2", "Bob", &["FRIDAY"], &[]);
        insert_teacher(&conn, "S1", "T3", "Carol", &[], &[1]);
        insert_subject(&conn, "S1", "MATH", "Mathematics");
        insert_subject(&conn, "S1", "ENG", "English");
        insert_subject(&conn, "S1", "BIO", "Biology");
        insert_subject(&conn, "S1", "ART", "Art");

        for class_id in ["C1", "C2"] {
            insert_subject_assignment(&conn, "S1", &format!("A-{}-MATH", class_id), "T1", class_id, "MATH", 6);
            insert_subject_assignment(&conn, "S1", &format!("A-{}-ENG", class_id), "T2", class_id, "ENG", 4);
            insert_subject_assignment(&conn, "S1", &format!("A-{}-BIO", class_id), "T3", class_id, "BIO", 4);
        }
    }

    let api = create_api(&db_path);
    api.seed_standard_grid("S1").unwrap();
    let result = api.generate("S1");
    assert!(result.success);
    assert!(result.conflicts.is_empty(), "{:?}", result.conflicts);
    assert_eq!(result.lessons_created, 28);

    (temp_file, db_path, api)
}

fn load_lessons(db_path: &str) -> Vec<ScheduledLesson> {
    ScheduledLessonRepository::new(open_shared(db_path))
        .find_by_school("S1")
        .unwrap()
}

fn lesson_ids<F>(lessons: &[ScheduledLesson], keep: F) -> BTreeSet<String>
where
    F: Fn(&ScheduledLesson) -> bool,
{
    lessons.iter().filter(|l| keep(l)).map(|l| l.id.clone()).collect()
}

// ==========================================
// 班级范围
// ==========================================

#[test]
fn test_class_regeneration_keeps_other_classes() {
    let (_temp_file, db_path, api) = setup_generated_school();
    let before = load_lessons(&db_path);
    let other_before = lesson_ids(&before, |l| l.class_id != "C1");
    let own_before = lesson_ids(&before, |l| l.class_id == "C1");

    let result = api.generate_for_class("S1", "C1", GenerateOptions::default());
    assert!(result.success);
    assert!(result.conflicts.is_empty(), "{:?}", result.conflicts);
    assert_eq!(result.lessons_created, 14);

    let after = load_lessons(&db_path);
    assert_eq!(after.len(), 28);
    assert_eq!(lesson_ids(&after, |l| l.class_id != "C1"), other_before);
    // C1 的课程行被替换为新行
    assert!(lesson_ids(&after, |l| l.class_id == "C1").is_disjoint(&own_before));

    assert!(api.audit_school("S1").unwrap().is_empty());
}

#[test]
fn test_incremental_class_run_on_covered_class_writes_nothing() {
    let (_temp_file, db_path, api) = setup_generated_school();
    let before = lesson_ids(&load_lessons(&db_path), |_| true);

    let result = api.generate_for_class("S1", "C1", INCREMENTAL);
    assert!(result.success);
    assert!(result.conflicts.is_empty());
    assert_eq!(result.lessons_created, 0);

    assert_eq!(lesson_ids(&load_lessons(&db_path), |_| true), before);
}

#[test]
fn test_incremental_class_run_fills_new_assignment() {
    let (_temp_file, db_path, api) = setup_generated_school();
    let before = lesson_ids(&load_lessons(&db_path), |_| true);

    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        insert_subject_assignment(&conn, "S1", "A-C1-ART", "T3", "C1", "ART", 2);
    }

    let result = api.generate_for_class("S1", "C1", INCREMENTAL);
    assert!(result.success);
    assert!(result.conflicts.is_empty(), "{:?}", result.conflicts);
    assert_eq!(result.lessons_created, 2);

    let after = load_lessons(&db_path);
    assert_eq!(after.len(), 30);
    // 已有课程原样保留
    assert!(before.is_subset(&lesson_ids(&after, |_| true)));

    let art: Vec<&ScheduledLesson> = after
        .iter()
        .filter(|l| l.subject_id.as_deref() == Some("ART"))
        .collect();
    assert_eq!(art.len(), 2);
    assert!(art.iter().all(|l| l.class_id == "C1" && l.teacher_id == "T3"));

    assert!(api.audit_school("S1").unwrap().is_empty());
}

#[test]
fn test_regenerate_flag_overrides_incremental() {
    let (_temp_file, db_path, api) = setup_generated_school();

    let options = GenerateOptions {
        incremental: true,
        regenerate: true,
    };
    let result = api.generate_for_class("S1", "C2", options);
    assert!(result.success);
    assert_eq!(result.lessons_created, 14);
    assert_eq!(load_lessons(&db_path).len(), 28);
}

// ==========================================
// 教师范围
// ==========================================

#[test]
fn test_teacher_regeneration_keeps_other_teachers() {
    let (_temp_file, db_path, api) = setup_generated_school();
    let before = load_lessons(&db_path);
    let other_before = lesson_ids(&before, |l| l.teacher_id != "T2");

    let result = api.generate_for_teacher("S1", "T2", REGENERATE);
    assert!(result.success);
    assert!(result.conflicts.is_empty(), "{:?}", result.conflicts);
    assert_eq!(result.lessons_created, 8);

    let after = load_lessons(&db_path);
    assert_eq!(after.len(), 28);
    assert_eq!(lesson_ids(&after, |l| l.teacher_id != "T2"), other_before);
    // Bob 周五不可用
    assert!(after
        .iter()
        .filter(|l| l.teacher_id == "T2")
        .all(|l| l.day != chrono::Weekday::Fri));

    assert!(api.audit_school("S1").unwrap().is_empty());
}

#[test]
fn test_teacher_without_assignments_fails() {
    let (_temp_file, db_path, api) = setup_generated_school();
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        insert_teacher(&conn, "S1", "T9", "Zoe", &[], &[]);
    }

    let result = api.generate_for_teacher("S1", "T9", GenerateOptions::default());
    assert!(!result.success);
    assert_eq!(result.conflicts.len(), 1);
    assert!(result.conflicts[0].message.contains("Zoe"));
    assert_eq!(load_lessons(&db_path).len(), 28);
}

#[test]
fn test_scoped_runs_are_logged_with_scope_label() {
    let (_temp_file, db_path, api) = setup_generated_school();

    let class_run = api.generate_for_class("S1", "C1", INCREMENTAL);
    let teacher_run = api.generate_for_teacher("S1", "T1", REGENERATE);

    let runs = api.recent_runs("S1", 10).unwrap();
    assert_eq!(runs.len(), 3);

    let class_log = runs.iter().find(|r| r.run_id == class_run.run_id).unwrap();
    assert_eq!(class_log.scope, "CLASS:C1");
    assert!(class_log.incremental);

    let teacher_log = runs.iter().find(|r| r.run_id == teacher_run.run_id).unwrap();
    assert_eq!(teacher_log.scope, "TEACHER:T1");
    assert!(!teacher_log.incremental);
    assert_eq!(teacher_log.lessons_created, 12);

    assert_eq!(count_lessons(&open_sqlite_connection(&db_path).unwrap(), "S1"), 28);
}

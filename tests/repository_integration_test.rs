// ==========================================
// Repository 集成测试
// ==========================================
// 职责: 验证各仓储的读写、JSON 列解析与事务替换
// ==========================================


use chrono::{NaiveDate, Weekday};
use school_timetable::domain::{GenerationLog, GenerationScope, ModuleCategory, ScheduledLesson};
use school_timetable::engine::TimeGrid;
use school_timetable::repository::{
    AssignmentRepository, GenerationLogRepository, RepositoryError, ScheduledLessonRepository,
    SchoolDirectoryRepository, TimeSlotRepository,
};
use school_timetable::db::open_sqlite_connection;
use school_timetable::domain::Assignment;
use test_helpers::*;

fn lesson(id: &str, teacher_id: &str, class_id: &str, day: Weekday, period: u8) -> ScheduledLesson {
    ScheduledLesson {
        id: id.to_string(),
        school_id: "S1".to_string(),
        teacher_id: teacher_id.to_string(),
        class_id: class_id.to_string(),
        subject_id: Some("MATH".to_string()),
        module_id: None,
        time_slot_id: format!("S1-{:?}-P{:02}", day, period),
        day,
        period,
        created_at: NaiveDate::from_ymd_opt(2026, 2, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    }
}

#[test]
fn test_time_slot_repository_round_trip() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = TimeSlotRepository::new(open_shared(&db_path));

    let slots = TimeGrid::standard_week("S1");
    assert_eq!(repo.insert_batch(&slots).unwrap(), slots.len());
    assert_eq!(repo.count_by_school("S1").unwrap(), slots.len());
    assert_eq!(repo.count_by_school("S2").unwrap(), 0);

    let loaded = repo.find_by_school("S1").unwrap();
    assert_eq!(loaded.len(), slots.len());
    // 按星期与开始时间排序：第一条是周一早读
    assert_eq!(loaded[0].day, Weekday::Mon);
    assert!(loaded[0].is_break);
    assert_eq!(loaded[0].label.as_deref(), Some("Assembly"));

    let monday_p1 = loaded
        .iter()
        .find(|s| s.day == Weekday::Mon && s.period == 1)
        .unwrap();
    assert_eq!(monday_p1.duration_minutes(), 45);
    assert!(monday_p1.is_morning());
}

#[test]
fn test_directory_repository_parses_teachers() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        insert_school(&conn, "S1", "Green Hills");
        insert_class(&conn, "S1", "C1", "Senior 2A", "S2");
        insert_teacher(&conn, "S1", "T1", "Alice", &["MONDAY", "FRIDAY"], &[1, 10]);
        insert_teacher(&conn, "S1", "T2", "Bob", &[], &[]);
        insert_subject(&conn, "S1", "MATH", "Mathematics");
        insert_module(&conn, "S1", "M1", "Networking");
    }

    let repo = SchoolDirectoryRepository::new(open_shared(&db_path));
    assert!(repo.school_exists("S1").unwrap());
    assert!(!repo.school_exists("S9").unwrap());

    let classes = repo.find_classes("S1").unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].level, "S2");

    let teachers = repo.find_teachers("S1").unwrap();
    assert_eq!(teachers.len(), 2);
    let alice = &teachers[0];
    assert_eq!(alice.unavailable_days, vec![Weekday::Mon, Weekday::Fri]);
    assert_eq!(alice.unavailable_periods, vec![1, 10]);
    assert!(!alice.is_available(Weekday::Mon, 3));
    assert!(!alice.is_available(Weekday::Tue, 10));
    assert!(alice.is_available(Weekday::Tue, 3));
    assert!(teachers[1].unavailable_days.is_empty());

    assert_eq!(repo.find_subject_names("S1").unwrap()["MATH"], "Mathematics");
    assert_eq!(repo.find_module_names("S1").unwrap()["M1"], "Networking");
}

#[test]
fn test_assignment_repository_keeps_unknown_category() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        insert_subject_assignment(&conn, "S1", "A1", "T1", "C1", "MATH", 5);
        insert_module_assignment(&conn, "S1", "MA1", "T2", "C2", "M1", 6, "specific");
        insert_module_assignment(&conn, "S1", "MA2", "T2", "C2", "M2", 3, "ELECTIVE");
    }

    let repo = AssignmentRepository::new(open_shared(&db_path));
    let all = repo.find_all("S1").unwrap();
    assert_eq!(all.len(), 3);
    // 科目在前，模块在后
    assert!(matches!(all[0], Assignment::Subject(_)));

    let modules = repo.find_module_assignments("S1").unwrap();
    assert_eq!(modules[0].category, Some(ModuleCategory::Specific));
    assert_eq!(modules[1].category, None);
    assert_eq!(modules[1].total_hours, 3);
}

#[test]
fn test_assignment_repository_rejects_implausible_periods() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        insert_subject_assignment(&conn, "S1", "A1", "T1", "C1", "MATH", 168);
        insert_module_assignment(&conn, "S2", "MA1", "T2", "C2", "M1", 169, "GENERAL");
    }

    let repo = AssignmentRepository::new(open_shared(&db_path));
    assert_eq!(repo.find_all("S1").unwrap()[0].weekly_periods(), 168);

    let err = repo.find_all("S2").unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::FieldValueError { ref field, .. } if field == "total_hours"
    ));
}

#[test]
fn test_replace_scope_only_touches_scope() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ScheduledLessonRepository::new(open_shared(&db_path));

    repo.insert_batch(&[
        lesson("L1", "T1", "C1", Weekday::Mon, 1),
        lesson("L2", "T1", "C2", Weekday::Mon, 2),
        lesson("L3", "T2", "C1", Weekday::Tue, 1),
    ])
    .unwrap();
    assert_eq!(repo.count_by_school("S1").unwrap(), 3);

    let scope = GenerationScope::Class {
        class_id: "C1".to_string(),
    };
    let (deleted, inserted) = repo
        .replace_scope("S1", &scope, &[lesson("L4", "T1", "C1", Weekday::Wed, 3)])
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(inserted, 1);

    let mut ids: Vec<String> = repo
        .find_by_school("S1")
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["L2".to_string(), "L4".to_string()]);

    let loaded = repo.find_by_school("S1").unwrap();
    let l4 = loaded.iter().find(|l| l.id == "L4").unwrap();
    assert_eq!(l4.day, Weekday::Wed);
    assert_eq!(l4.period, 3);
    assert_eq!(l4.subject_id.as_deref(), Some("MATH"));
}

#[test]
fn test_replace_scope_rolls_back_on_failure() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ScheduledLessonRepository::new(open_shared(&db_path));
    repo.insert_batch(&[lesson("L1", "T1", "C1", Weekday::Mon, 1)])
        .unwrap();

    // 主键重复：插入失败，删除也必须回滚
    let duplicate = vec![
        lesson("L9", "T1", "C1", Weekday::Tue, 1),
        lesson("L9", "T1", "C1", Weekday::Tue, 2),
    ];
    let scope = GenerationScope::Teacher {
        teacher_id: "T1".to_string(),
    };
    assert!(repo.replace_scope("S1", &scope, &duplicate).is_err());

    let remaining = repo.find_by_school("S1").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "L1");
}

#[test]
fn test_generation_log_find_recent() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = GenerationLogRepository::new(open_shared(&db_path));

    for (i, run_id) in ["R1", "R2", "R3"].iter().enumerate() {
        repo.insert(&GenerationLog {
            run_id: run_id.to_string(),
            school_id: "S1".to_string(),
            scope: "SCHOOL".to_string(),
            incremental: false,
            success: i != 1,
            lessons_created: 10 * i,
            conflict_count: i,
            conflicts_json: Some(serde_json::json!([])),
            elapsed_ms: 5,
            created_at: NaiveDate::from_ymd_opt(2026, 2, 2)
                .unwrap()
                .and_hms_opt(8, i as u32, 0)
                .unwrap(),
        })
        .unwrap();
    }

    let recent = repo.find_recent("S1", 2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].run_id, "R3");
    assert_eq!(recent[1].run_id, "R2");
    assert!(!recent[1].success);
    assert_eq!(recent[0].conflicts_json, Some(serde_json::json!([])));
    assert!(repo.find_recent("S2", 10).unwrap().is_empty());
}

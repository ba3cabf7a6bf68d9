// ==========================================
// 学校排课系统 - 命令行入口
// ==========================================
// 用法:
//   school-timetable [--db <path>] generate  <school_id>
//   school-timetable [--db <path>] class     <school_id> <class_id>   [--incremental] [--regenerate]
//   school-timetable [--db <path>] teacher   <school_id> <teacher_id> [--incremental] [--regenerate]
//   school-timetable [--db <path>] audit     <school_id>
//   school-timetable [--db <path>] seed-grid <school_id>
//   school-timetable [--db <path>] runs      <school_id> [limit]
// 输出: JSON (stdout)
// ==========================================

use anyhow::{bail, Context};
use school_timetable::api::GenerateOptions;
use school_timetable::app::{get_default_db_path, AppState};

const USAGE: &str = "usage: school-timetable [--db <path>] \
<generate|class|teacher|audit|seed-grid|runs> <school_id> [id|limit] [--incremental] [--regenerate]";

struct CliArgs {
    db_path: String,
    command: String,
    school_id: String,
    target: Option<String>,
    options: GenerateOptions,
}

fn parse_args(raw: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut db_path = None;
    let mut options = GenerateOptions::default();
    let mut positional = Vec::new();

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => db_path = Some(iter.next().context("--db 缺少路径")?),
            "--incremental" => options.incremental = true,
            "--regenerate" => options.regenerate = true,
            flag if flag.starts_with("--") => bail!("未知参数: {}\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = positional.next().context(USAGE)?;
    let school_id = positional.next().context(USAGE)?;
    let target = positional.next();

    Ok(CliArgs {
        db_path: db_path.unwrap_or_else(get_default_db_path),
        command,
        school_id,
        target,
        options,
    })
}

fn main() -> anyhow::Result<()> {
    school_timetable::logging::init();

    let args = parse_args(std::env::args().skip(1).collect())?;

    tracing::info!("==================================================");
    tracing::info!("学校排课系统 v{}", school_timetable::VERSION);
    tracing::info!("使用数据库: {}", args.db_path);
    tracing::info!("==================================================");

    let state = AppState::new(args.db_path.clone())?;
    let api = &state.timetable_api;

    let output = match args.command.as_str() {
        "generate" => serde_json::to_string_pretty(&api.generate(&args.school_id))?,
        "class" => {
            let class_id = args.target.as_deref().context("class 命令需要 class_id")?;
            let result = api.generate_for_class(&args.school_id, class_id, args.options);
            serde_json::to_string_pretty(&result)?
        }
        "teacher" => {
            let teacher_id = args.target.as_deref().context("teacher 命令需要 teacher_id")?;
            let result = api.generate_for_teacher(&args.school_id, teacher_id, args.options);
            serde_json::to_string_pretty(&result)?
        }
        "audit" => serde_json::to_string_pretty(&api.audit_school(&args.school_id)?)?,
        "seed-grid" => {
            let inserted = api.seed_standard_grid(&args.school_id)?;
            serde_json::to_string_pretty(&serde_json::json!({ "inserted": inserted }))?
        }
        "runs" => {
            let limit = match args.target.as_deref() {
                Some(raw) => raw.parse::<usize>().with_context(|| format!("limit 非法: {}", raw))?,
                None => 10,
            };
            serde_json::to_string_pretty(&api.recent_runs(&args.school_id, limit)?)?
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    };

    println!("{}", output);
    Ok(())
}

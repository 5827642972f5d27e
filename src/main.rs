// ==========================================
// 藻类养殖 ATP 系统 - 命令行演示入口
// ==========================================
// 用法: algatrack <数量(吨)> <YYYY-MM-DD> [用户]
// 输出: 展示结构 JSON { summary, color, data }
// ==========================================

use algatrack::app::{get_default_db_path, AppState};
use algatrack::logging;
use std::process::ExitCode;

const DEFAULT_USER: &str = "cli";

fn usage() -> String {
    "用法: algatrack <数量(吨)> <YYYY-MM-DD> [用户]".to_string()
}

fn run(args: &[String]) -> Result<String, String> {
    let (raw_quantity, raw_date) = match args {
        [quantity, date, ..] => (quantity, date),
        _ => return Err(usage()),
    };
    let quantity: f64 = raw_quantity
        .trim()
        .parse()
        .map_err(|_| format!("数量无法解析: '{}'\n{}", raw_quantity, usage()))?;
    let user = args.get(2).map(String::as_str).unwrap_or(DEFAULT_USER);

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)?;
    let seeded = state
        .config_manager
        .seed_defaults()
        .map_err(|e| format!("默认配置初始化失败: {}", e))?;
    if seeded.parameters_inserted > 0 || seeded.seasons_inserted > 0 {
        tracing::info!(
            parameters = seeded.parameters_inserted,
            seasons = seeded.seasons_inserted,
            "已写入默认配置"
        );
    }

    let summary = state
        .simulation_api
        .run_simulation(quantity, Some(raw_date.as_str()), user)
        .map_err(|e| format!("[{}] {}", e.code(), e))?;

    serde_json::to_string_pretty(&summary).map_err(|e| format!("结果序列化失败: {}", e))
}

fn main() -> ExitCode {
    logging::init();

    tracing::info!("{} v{}", algatrack::APP_NAME, algatrack::VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

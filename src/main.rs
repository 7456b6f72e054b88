// ==========================================
// SAN 配置导入管道 - CLI 主入口
// ==========================================
// 用法:
//   san-import detect  <file>
//   san-import preview <file> [--customer ID] [--no-conflicts]
//   san-import commit  <file> [--customer ID] [--fabric ID] [--resolutions FILE]
// 输出: stdout 为 JSON，日志写 stderr
// 数据库: --db / SAN_IMPORT_DB_PATH 或用户数据目录
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use san_import::app::{get_default_db_path, AppState};
use san_import::importer::ConflictResolutions;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "san-import", version)]
#[command(about = "导入 Cisco / Brocade / Storage Insights 的 SAN 配置")]
struct Cli {
    /// 数据库文件路径
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 仅检测输入格式
    Detect {
        file: PathBuf,
    },
    /// 解析并预览，不写库
    Preview {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        customer: i64,
        /// 跳过冲突检测
        #[arg(long)]
        no_conflicts: bool,
    },
    /// 解析并在单个事务内落库
    Commit {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        customer: i64,
        /// 写入已有 Fabric，而非按解析结果创建
        #[arg(long)]
        fabric: Option<i64>,
        /// 冲突策略 JSON 文件
        #[arg(long)]
        resolutions: Option<PathBuf>,
    },
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("无法读取输入文件: {}", path.display()))
}

fn read_resolutions(path: Option<&Path>) -> Result<ConflictResolutions> {
    let Some(path) = path else {
        return Ok(ConflictResolutions::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("无法读取冲突策略文件: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("冲突策略文件格式错误: {}", path.display()))
}

fn main() -> Result<()> {
    san_import::logging::init();
    let cli = Cli::parse();

    tracing::info!("{} v{}", san_import::APP_NAME, san_import::VERSION);

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path, None).map_err(anyhow::Error::msg)?;

    let output = match cli.command {
        Command::Detect { file } => {
            let text = read_input(&file)?;
            serde_json::json!({ "parser": state.importer.detect(&text)? })
        }
        Command::Preview {
            file,
            customer,
            no_conflicts,
        } => {
            let text = read_input(&file)?;
            let check_conflicts = no_conflicts.then_some(false);
            serde_json::to_value(state.importer.preview(&text, customer, check_conflicts)?)?
        }
        Command::Commit {
            file,
            customer,
            fabric,
            resolutions,
        } => {
            let text = read_input(&file)?;
            let resolutions = read_resolutions(resolutions.as_deref())?;
            serde_json::to_value(state.importer.commit(&text, customer, fabric, &resolutions)?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

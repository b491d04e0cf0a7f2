// ==========================================
// 混凝土库存台账 - 命令行入口
// ==========================================
// 子命令: status / entry / adjust / deduct / clear-log / reset / report
// 日志写入 stderr，命令结果写入 stdout
// ==========================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use concrete_stock::app::{get_default_db_path, AppState};
use concrete_stock::extraction::TicketDocument;
use concrete_stock::i18n::format_quantity;
use concrete_stock::{logging, ApiError, Material, ReconcileOutcome};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "concrete-stock")]
#[command(about = "骨料库存台账：入库、过磅扣减、产能估算")]
#[command(version)]
struct Args {
    /// 数据库文件路径
    #[arg(long, env = "CONCRETE_STOCK_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 显示库存与产能
    Status,

    /// 人工入库（增量）
    Entry {
        /// 物料名称或简写（B0 / B1 / AM / AB）
        material: String,
        /// 数量（kg），支持 "50.000" / "50,5"
        quantity: String,
    },

    /// 盘点调整（绝对值覆盖）
    Adjust {
        material: String,
        quantity: String,
    },

    /// 处理过磅单
    Deduct {
        /// 单据文件
        #[arg(long)]
        file: PathBuf,
        /// 媒体类型（缺省时按内容推断）
        #[arg(long)]
        media_type: Option<String>,
    },

    /// 清空流水
    ClearLog,

    /// 重置台账（需 --yes 确认）
    Reset {
        #[arg(long)]
        yes: bool,
    },

    /// 导出 CSV 报表
    Report {
        /// 输出文件（缺省输出到 stdout）
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_material(raw: &str) -> Result<Material> {
    match Material::from_str(raw) {
        Some(m) => Ok(m),
        None => bail!("未知物料: {}（可选: B0 / B1 / AM / AB）", raw),
    }
}

/// API 错误 => 面向用户的提示 + 原始错误
fn api_failure(e: ApiError) -> anyhow::Error {
    anyhow::anyhow!("{} ({})", e.user_message(), e)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let db_path = args
        .db_path
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);

    info!(version = concrete_stock::VERSION, %db_path, "启动 {}", concrete_stock::APP_NAME);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let api = &state.stock_api;
    let style = api.number_style();

    match args.command {
        Command::Status => {
            let snapshot = api.snapshot().map_err(api_failure)?;
            for m in concrete_stock::domain::MATERIALS {
                let flag = if snapshot.capacity.is_low_stock(m) { " !" } else { "" };
                println!(
                    "{:<16}{:>14} kg{}",
                    m.label(),
                    format_quantity(snapshot.ledger.quantity(m), style),
                    flag
                );
            }
            println!(
                "loads: {}  volume: {} m3",
                snapshot.capacity.loads_possible,
                format_quantity(snapshot.capacity.volume_possible_m3, style)
            );
            if let Some(limiting) = snapshot.capacity.limiting_material {
                println!("limiting: {}", limiting);
            }
        }

        Command::Entry { material, quantity } => {
            let material = parse_material(&material)?;
            let tx = api.record_entry(material, &quantity).map_err(api_failure)?;
            println!("{}", tx.details);
        }

        Command::Adjust { material, quantity } => {
            let material = parse_material(&material)?;
            let tx = api
                .set_adjustment(material, &quantity)
                .map_err(api_failure)?;
            println!("{}", tx.details);
        }

        Command::Deduct { file, media_type } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("无法读取单据: {}", file.display()))?;
            let document = TicketDocument::new(media_type.as_deref(), bytes);

            let outcome = api
                .process_scale_ticket(document)
                .await
                .map_err(api_failure)?;
            println!("{}", outcome.user_message(style));
            if let ReconcileOutcome::Applied { transaction, .. } = outcome {
                println!("{}", transaction.details);
            }
        }

        Command::ClearLog => {
            api.clear_log().map_err(api_failure)?;
        }

        Command::Reset { yes } => {
            if !yes {
                bail!("重置将清除全部库存与流水，请加 --yes 确认");
            }
            api.reset().map_err(api_failure)?;
        }

        Command::Report { out } => {
            let snapshot = api.snapshot().map_err(api_failure)?;
            let csv = state.report_api.render_csv(&snapshot).map_err(api_failure)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("无法写入报表: {}", path.display()))?;
                    info!(path = %path.display(), "报表已导出");
                }
                None => print!("{}", csv),
            }
        }
    }

    Ok(())
}

//! 数据中心逐跳转发仿真
//!
//! 读取 JSON 配置，运行时间步进仿真，按离线分析工具的格式导出
//! 每个交换机的入口记录、源/目的映射和触发到达记录。

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use syndb_sim::dump::FileSink;
use syndb_sim::sim::{SimConfig, Simulation};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "syndb-sim",
    about = "Time-stepped packet forwarding simulation with trigger dissemination"
)]
struct Args {
    /// Path to config JSON; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for dump files
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Prefix prepended to every dump file name
    #[arg(long, default_value = "")]
    prefix: String,

    /// Override total run time (ms)
    #[arg(long)]
    until_ms: Option<u64>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn run(args: &Args) -> syndb_sim::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => SimConfig::from_path(path)?,
        None => SimConfig::default(),
    };
    if let Some(ms) = args.until_ms {
        cfg.total_time_ns = ms.saturating_mul(1_000_000);
    }
    info!(topology = ?cfg.topology, total_time_ns = cfg.total_time_ns, "config loaded");

    let mut sim = Simulation::from_config(&cfg)?;
    let mut sink = FileSink::new(&args.out_dir, args.prefix.clone(), sim.topology().num_switches());
    let summary = sim.run(&mut sink)?;
    sink.finish()?;

    if let Some(path) = &args.summary_json {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
    }

    println!(
        "done @ {:?}, injected_pkts={}, delivered_pkts={}, delivered_bytes={}, flushed_pkts={}, triggers_completed={}",
        summary.end_time,
        summary.stats.injected_pkts,
        summary.stats.delivered_pkts,
        summary.stats.delivered_bytes,
        summary.stats.flushed_pkts,
        summary.stats.triggers_completed
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("syndb-sim: {e}");
            ExitCode::FAILURE
        }
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secretsweep_core::{
    report, run_with, ScanEngine, ScanOptions, Settings, DEFAULT_FILE_TARGET, DEFAULT_GLOB_TARGET,
};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "secretsweep", version, about = "项目密钥泄露扫描器")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描固定文件与 glob 目标，JSON 报告写到标准输出
    Scan {
        /// 显式文件目标
        #[arg(long, default_value = DEFAULT_FILE_TARGET)]
        file: PathBuf,

        /// glob 目标（裸后缀如 ".password" 按扩展名选取）
        #[arg(long, default_value = DEFAULT_GLOB_TARGET)]
        glob: String,

        /// 规则文件路径（TOML）；缺省使用内置默认规则
        #[arg(long)]
        rules: Option<PathBuf>,

        /// 扫描引擎：bytes 或 utf8（默认 bytes）
        #[arg(long, default_value = "bytes", value_parser = ["bytes", "utf8"])]
        engine: String,

        /// 最大扫描文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { file, glob, rules, engine, max_file_size } => {
            info!(?file, %glob, "starting scan");

            // 解析扫描引擎参数
            let engine = match engine.as_str() {
                "utf8" => ScanEngine::Utf8,
                _ => ScanEngine::Bytes,
            };
            let options = ScanOptions { max_file_size, engine };

            // 组装配置：--rules 优先，否则内置默认规则
            let settings = match rules {
                Some(path) => Settings::from_rules_file(&path, options)
                    .with_context(|| format!("load rules file {}", path.display()))?,
                None => Settings::default_rules(options).context("build default settings")?,
            };

            // 固定顺序：先文件目标，再 glob 目标；失败原样传播（非零退出）
            let secrets = run_with(settings, &file, &glob).context("scan failed")?;

            // 报告一次性写标准输出（两空格缩进 JSON）
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            report(&secrets, &mut out).context("write report")?;
            out.flush().ok();

            info!(
                files_scanned = secrets.stats().files_scanned,
                findings = secrets.total_findings(),
                "scan finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

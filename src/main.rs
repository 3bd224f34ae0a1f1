mod cli;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;

use crate::cli::CliArgs;

/// 初始化日志：默认写入临时目录的日志文件，--verbose 时输出到 stderr
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    if verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let log_path = everything_fs::config::log_file_path();
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::info!("日志文件: {}", log_path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose)?;
    cli::run_cli(args)
}

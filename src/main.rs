//! # Notes Backend 主程序
//!
//! 带 JWT 登录与刷新令牌轮换的笔记 REST 服务

use clap::Parser;
use notes_backend::{
    Result,
    config::load_config,
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
    server_setup,
};
use std::path::PathBuf;

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "notes-backend", version, about)]
struct Args {
    /// 配置文件路径（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志系统
    logging::init_logging(args.log_level.as_deref());

    let config = load_config(args.config.as_deref()).inspect_err(|e| {
        lerror!(
            "system",
            LogStage::Configuration,
            LogComponent::Main,
            "config_failed",
            &format!("配置加载失败: {e:?}")
        );
    })?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );
    if let Err(e) = server_setup::run_server(config).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务启动失败: {e:?}")
        );
        std::process::exit(1);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}

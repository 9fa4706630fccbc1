// ==========================================
// IMP 批次导入服务 - 主入口
// ==========================================
// 流程: 日志 → 配置 → AppState → 启动监听 → 等待 Ctrl-C
// ==========================================

use anyhow::Context;
use imp_server::app::AppState;
use imp_server::config::ServerConfig;
use imp_server::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", imp_server::APP_NAME);
    tracing::info!("系统版本: {}", imp_server::VERSION);
    tracing::info!("==================================================");

    let config = ServerConfig::from_env();
    tracing::info!(db_path = %config.db_path.display(), "使用批次日志数据库");

    let state = AppState::new(config).map_err(anyhow::Error::msg)?;
    let watcher = state.start().await.map_err(anyhow::Error::msg)?;
    tracing::info!("服务已启动，按 Ctrl-C 退出");

    tokio::signal::ctrl_c()
        .await
        .context("无法监听 Ctrl-C 信号")?;

    tracing::info!("收到退出信号，正在停止...");
    watcher.shutdown().await;
    tracing::info!("服务已退出");
    Ok(())
}

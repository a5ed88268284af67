//! # 服务启动流程
//!
//! 数据库 → 上下文 → 后台任务 → HTTP 服务器 → 等待关闭

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::ApiServer;
use crate::app::AppContext;
use crate::auth::{RefreshTokenCleanupTask, RefreshTokenManager};
use crate::config::AppConfig;
use crate::database::{self, SeaOrmCredentialStore};
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, linfo, lwarn};

/// 初始化数据库并构建应用上下文
pub async fn bootstrap(config: AppConfig) -> Result<Arc<AppContext>> {
    let db = database::init_database(&config.database).await?;
    database::run_migrations(&db).await?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::ServerSetup,
        "database_ready",
        "✅ Database ready"
    );

    let context = AppContext::build(config, db)?;
    database::ensure_default_admin(&context.db, &context.password_hasher()).await?;

    Ok(Arc::new(context))
}

/// 启动过期刷新令牌清理任务
fn spawn_cleanup_task(context: &AppContext) -> Option<JoinHandle<()>> {
    let settings = &context.config.refresh_token;
    let task = RefreshTokenCleanupTask::new(
        Arc::new(SeaOrmCredentialStore::new(context.db.clone())),
        RefreshTokenManager::new(settings.expiration_hours.clone()),
        settings.cleanup_interval_seconds,
    );

    let handle = task.spawn();
    if handle.is_none() {
        lwarn!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "cleanup_disabled",
            "Refresh token cleanup task disabled (interval = 0)"
        );
    }
    handle
}

/// 处理 Ctrl+C 信号
async fn handle_ctrl_c_signal() -> String {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "Ctrl+C signal".to_string(),
        Err(e) => {
            lerror!(
                "system",
                LogStage::Shutdown,
                LogComponent::ServerSetup,
                "ctrl_c_error",
                &format!("Failed to listen for Ctrl+C: {e:?}")
            );
            "Ctrl+C handler error".to_string()
        }
    }
}

/// 运行服务器直到收到关闭信号或服务器退出
pub async fn run_server(config: AppConfig) -> Result<()> {
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::ServerSetup,
        "start_server",
        "🚀 Starting notes backend..."
    );

    let context = bootstrap(config).await?;
    let server = ApiServer::new(&context.config.server, Arc::clone(&context))?;
    let cleanup_task = spawn_cleanup_task(&context);
    let mut server_task = tokio::spawn(server.serve());

    let shutdown_reason = tokio::select! {
        reason = handle_ctrl_c_signal() => reason,
        result = &mut server_task => match result {
            Ok(Ok(())) => "HTTP server exit".to_string(),
            Ok(Err(e)) => {
                lerror!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::ServerSetup,
                    "server_error",
                    &format!("HTTP server error: {e:?}")
                );
                "HTTP server error".to_string()
            }
            Err(e) => {
                lerror!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::ServerSetup,
                    "server_panic",
                    &format!("HTTP server panicked: {e:?}")
                );
                "HTTP server panic".to_string()
            }
        },
    };

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::ServerSetup,
        "shutdown_initiated",
        &format!("🛑 Graceful shutdown: {shutdown_reason}")
    );

    server_task.abort();
    if let Some(handle) = cleanup_task {
        handle.abort();
    }
    context.db.clone().close().await?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::ServerSetup,
        "server_stopped",
        "👋 Server stopped. Goodbye!"
    );
    Ok(())
}

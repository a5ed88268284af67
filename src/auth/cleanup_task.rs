//! # 刷新令牌清理任务
//!
//! 按固定间隔删除已过期的刷新令牌，每轮使用独立事务

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use super::refresh_token::RefreshTokenManager;
use super::store::CredentialStore;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, linfo};

/// 过期刷新令牌清理任务
pub struct RefreshTokenCleanupTask<S: CredentialStore> {
    store: Arc<S>,
    manager: RefreshTokenManager,
    interval_seconds: u64,
}

impl<S: CredentialStore + 'static> RefreshTokenCleanupTask<S> {
    pub const fn new(store: Arc<S>, manager: RefreshTokenManager, interval_seconds: u64) -> Self {
        Self {
            store,
            manager,
            interval_seconds,
        }
    }

    /// 启动清理循环
    pub async fn start(&self) {
        linfo!(
            "system",
            LogStage::BackgroundTask,
            LogComponent::CleanupTask,
            "start",
            &format!(
                "Starting refresh token cleanup task, interval: {}s",
                self.interval_seconds
            )
        );

        let mut interval = time::interval(Duration::from_secs(self.interval_seconds));
        loop {
            interval.tick().await;

            if let Err(e) = self.run_once().await {
                lerror!(
                    "system",
                    LogStage::BackgroundTask,
                    LogComponent::CleanupTask,
                    "cleanup_failed",
                    &format!("Failed to purge expired refresh tokens: {e:?}")
                );
            }
        }
    }

    /// 执行一次清理，返回删除数量
    pub async fn run_once(&self) -> Result<u64> {
        let mut tx = self.store.begin().await?;
        match self
            .manager
            .purge_expired(self.store.as_ref(), &mut tx, Utc::now())
            .await
        {
            Ok(deleted) => {
                self.store.commit(tx).await?;
                if deleted > 0 {
                    linfo!(
                        "system",
                        LogStage::BackgroundTask,
                        LogComponent::CleanupTask,
                        "purged",
                        &format!("Deleted {deleted} expired refresh tokens")
                    );
                }
                Ok(deleted)
            }
            Err(err) => {
                if let Err(rollback_err) = self.store.rollback(tx).await {
                    lerror!(
                        "system",
                        LogStage::BackgroundTask,
                        LogComponent::CleanupTask,
                        "rollback_failed",
                        &format!("Rollback after failed purge failed: {rollback_err:?}")
                    );
                }
                Err(err)
            }
        }
    }

    /// 在后台运行；间隔为 0 时不启动
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        if self.interval_seconds == 0 {
            return None;
        }
        Some(tokio::spawn(async move { self.start().await }))
    }
}

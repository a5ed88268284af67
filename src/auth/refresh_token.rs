//! # 刷新令牌管理
//!
//! 每个账户同一时刻至多持有一条刷新令牌记录。所有操作都在调用方的事务内执行。

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::store::{CredentialStore, RefreshTokenRecord};
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage, sanitize_token};
use crate::{ldebug, lwarn};

/// 刷新令牌管理器
#[derive(Debug, Clone)]
pub struct RefreshTokenManager {
    /// 原始配置值（小时），使用时才解析
    expiration_hours: String,
}

impl RefreshTokenManager {
    pub fn new(expiration_hours: impl Into<String>) -> Self {
        Self {
            expiration_hours: expiration_hours.into(),
        }
    }

    /// 解析令牌有效期，必须为正整数小时
    pub fn ttl(&self) -> Result<Duration> {
        self.expiration_hours
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|hours| *hours > 0)
            .and_then(Duration::try_hours)
            .ok_or_else(|| AppError::config("Invalid REFRESH_TOKEN_EXPIRATION_HOURS"))
    }

    /// 轮换：删除账户的旧令牌并写入新令牌
    pub async fn rotate<S: CredentialStore>(
        &self,
        store: &S,
        tx: &mut S::Tx,
        account_id: i64,
    ) -> Result<RefreshTokenRecord> {
        let ttl = self.ttl()?;

        if let Some(existing) = store.find_refresh_token_by_account(tx, account_id).await? {
            store.delete_refresh_token(tx, &existing.token).await?;
            ldebug!(
                "system",
                LogStage::TokenRefresh,
                LogComponent::RefreshToken,
                "revoke_previous",
                &format!(
                    "Revoked refresh token {} of account {account_id}",
                    sanitize_token(&existing.token)
                )
            );
        }

        let record = RefreshTokenRecord {
            token: Uuid::new_v4().to_string(),
            account_id,
            expires_at: Utc::now() + ttl,
        };
        store.insert_refresh_token(tx, &record).await?;

        Ok(record)
    }

    /// 校验令牌存在且未过期；过期记录保留，由清理任务删除
    pub async fn validate<S: CredentialStore>(
        &self,
        store: &S,
        tx: &mut S::Tx,
        token: &str,
    ) -> Result<RefreshTokenRecord> {
        let Some(record) = store.find_refresh_token(tx, token).await? else {
            lwarn!(
                "system",
                LogStage::TokenRefresh,
                LogComponent::RefreshToken,
                "token_not_found",
                &format!("Refresh token {} not found", sanitize_token(token))
            );
            return Err(AppError::unauthorized("Invalid or expired refresh token")
                .with_details("Refresh token not found"));
        };

        if record.is_expired_at(Utc::now()) {
            lwarn!(
                "system",
                LogStage::TokenRefresh,
                LogComponent::RefreshToken,
                "token_expired",
                &format!(
                    "Refresh token {} of account {} expired at {}",
                    sanitize_token(token),
                    record.account_id,
                    record.expires_at
                )
            );
            return Err(AppError::unauthorized("Expired refresh token"));
        }

        Ok(record)
    }

    /// 删除 `now` 之前过期的全部记录
    pub async fn purge_expired<S: CredentialStore>(
        &self,
        store: &S,
        tx: &mut S::Tx,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        store.delete_expired_refresh_tokens(tx, now).await
    }
}

//! # 认证会话服务
//!
//! 登录与刷新令牌交换。两者都在单个事务中完成，任一步骤失败即回滚。

use chrono::Utc;
use std::sync::Arc;

use super::jwt::JwtManager;
use super::password::PasswordHasher;
use super::refresh_token::RefreshTokenManager;
use super::store::{Account, CredentialStore};
use super::types::{SessionPayload, TOKEN_TYPE_BEARER, TokenResponse};
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo, lwarn};

/// 用户名或密码错误时统一返回的消息
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// 按固定顺序检查账户状态标志
pub fn check_account_flags(account: &Account) -> Result<()> {
    if !account.is_enabled {
        return Err(AppError::forbidden("Account is disabled"));
    }
    if !account.is_account_non_expired {
        return Err(AppError::forbidden("Account is expired"));
    }
    if !account.is_account_non_locked {
        return Err(AppError::forbidden("Account is locked"));
    }
    if !account.is_credentials_non_expired {
        return Err(AppError::unauthorized("Credentials are expired"));
    }
    if account.is_deleted {
        return Err(AppError::forbidden("Account is deleted"));
    }
    Ok(())
}

/// 认证会话服务
pub struct AuthSessionService<S: CredentialStore> {
    store: S,
    jwt: Arc<JwtManager>,
    refresh_tokens: RefreshTokenManager,
    passwords: PasswordHasher,
    /// 刷新时是否重新检查账户状态
    recheck_on_refresh: bool,
}

impl<S: CredentialStore> AuthSessionService<S> {
    pub fn new(
        store: S,
        jwt: Arc<JwtManager>,
        refresh_tokens: RefreshTokenManager,
        passwords: PasswordHasher,
    ) -> Self {
        Self {
            store,
            jwt,
            refresh_tokens,
            passwords,
            recheck_on_refresh: false,
        }
    }

    #[must_use]
    pub const fn with_recheck_on_refresh(mut self, enabled: bool) -> Self {
        self.recheck_on_refresh = enabled;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn refresh_tokens(&self) -> &RefreshTokenManager {
        &self.refresh_tokens
    }

    /// 用户名密码登录
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let mut tx = self.store.begin().await?;
        match self.login_in_tx(&mut tx, username, password).await {
            Ok(response) => {
                self.store.commit(tx).await?;
                linfo!(
                    "system",
                    LogStage::Authentication,
                    LogComponent::AuthService,
                    "login_success",
                    &format!("User {username} logged in")
                );
                Ok(response)
            }
            Err(err) => {
                self.abort(tx, "login").await;
                Err(err)
            }
        }
    }

    /// 以刷新令牌换取新的访问令牌与刷新令牌
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let mut tx = self.store.begin().await?;
        match self.exchange_in_tx(&mut tx, refresh_token).await {
            Ok(response) => {
                self.store.commit(tx).await?;
                Ok(response)
            }
            Err(err) => {
                self.abort(tx, "exchange_refresh_token").await;
                Err(err)
            }
        }
    }

    async fn login_in_tx(
        &self,
        tx: &mut S::Tx,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse> {
        let Some(account) = self.store.find_account_by_username(tx, username).await? else {
            lwarn!(
                "system",
                LogStage::Authentication,
                LogComponent::AuthService,
                "unknown_user",
                &format!("Login rejected: no account named {username}")
            );
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if let Err(err) = check_account_flags(&account) {
            lwarn!(
                "system",
                LogStage::Authentication,
                LogComponent::AuthService,
                "account_state",
                &format!("Login rejected for {username}: {}", err.message())
            );
            return Err(err);
        }

        if !self.passwords.verify(password, &account.password_hash).await? {
            lwarn!(
                "system",
                LogStage::Authentication,
                LogComponent::AuthService,
                "wrong_password",
                &format!("Login rejected: wrong password for {username}")
            );
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let response = self.issue_tokens(tx, &account).await?;

        let updated = self
            .store
            .update_last_login(tx, account.id, Utc::now())
            .await?;
        if updated == 0 {
            return Err(AppError::not_found("User not found"));
        }

        Ok(response)
    }

    async fn exchange_in_tx(&self, tx: &mut S::Tx, refresh_token: &str) -> Result<TokenResponse> {
        let record = self
            .refresh_tokens
            .validate(&self.store, tx, refresh_token)
            .await?;

        let Some(account) = self.store.find_account_by_id(tx, record.account_id).await? else {
            lwarn!(
                "system",
                LogStage::TokenRefresh,
                LogComponent::AuthService,
                "unknown_account",
                &format!("Refresh token references missing account {}", record.account_id)
            );
            return Err(AppError::unauthorized("User not found"));
        };

        if self.recheck_on_refresh {
            check_account_flags(&account)?;
        }

        let response = self.issue_tokens(tx, &account).await?;
        ldebug!(
            "system",
            LogStage::TokenRefresh,
            LogComponent::AuthService,
            "refresh_success",
            &format!("Rotated refresh token for account {}", account.id)
        );
        Ok(response)
    }

    /// 签发访问令牌并轮换刷新令牌
    async fn issue_tokens(&self, tx: &mut S::Tx, account: &Account) -> Result<TokenResponse> {
        let access_token = self.jwt.sign(&SessionPayload::from_account(account))?;
        let expiration_at = self.jwt.expiration_of(&access_token)?;
        let refresh = self.refresh_tokens.rotate(&self.store, tx, account.id).await?;

        Ok(TokenResponse {
            access_token,
            refresh_token: refresh.token,
            expiration_at,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        })
    }

    // 回滚失败只记录，返回原始错误
    async fn abort(&self, tx: S::Tx, operation: &str) {
        if let Err(rollback_err) = self.store.rollback(tx).await {
            lerror!(
                "system",
                LogStage::Database,
                LogComponent::AuthService,
                "rollback_failed",
                &format!("Rollback after failed {operation} failed: {rollback_err:?}")
            );
        }
    }
}

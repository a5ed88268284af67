//! # 凭据存储抽象
//!
//! 认证服务只通过 `CredentialStore` 访问账户与刷新令牌，
//! 所有读写都发生在调用方持有的同一个事务内。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::AccountKind;
use crate::error::Result;

/// 认证所需的账户视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub firstname: String,
    pub lastname: Option<String>,
    pub is_enabled: bool,
    pub is_account_non_expired: bool,
    pub is_account_non_locked: bool,
    pub is_credentials_non_expired: bool,
    pub is_deleted: bool,
    pub account_kind: AccountKind,
    pub last_login: Option<DateTime<Utc>>,
    /// 角色名称，如 `ROLE_ADMIN`
    pub roles: Vec<String>,
}

/// 刷新令牌记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub account_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// `now` 严格晚于过期时间才算过期
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// 账户与刷新令牌的事务性存储
#[cfg_attr(test, mockall::automock(type Tx = ();))]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 事务句柄
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx>;
    async fn commit(&self, tx: Self::Tx) -> Result<()>;
    async fn rollback(&self, tx: Self::Tx) -> Result<()>;

    /// 按用户名查找未被软删除的账户（含角色）
    async fn find_account_by_username(
        &self,
        tx: &mut Self::Tx,
        username: &str,
    ) -> Result<Option<Account>>;

    async fn find_account_by_id(&self, tx: &mut Self::Tx, id: i64) -> Result<Option<Account>>;

    /// 返回受影响的行数
    async fn update_last_login(&self, tx: &mut Self::Tx, id: i64, at: DateTime<Utc>)
    -> Result<u64>;

    async fn find_refresh_token_by_account(
        &self,
        tx: &mut Self::Tx,
        account_id: i64,
    ) -> Result<Option<RefreshTokenRecord>>;

    async fn find_refresh_token(
        &self,
        tx: &mut Self::Tx,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>>;

    async fn delete_refresh_token(&self, tx: &mut Self::Tx, token: &str) -> Result<u64>;

    async fn insert_refresh_token(
        &self,
        tx: &mut Self::Tx,
        record: &RefreshTokenRecord,
    ) -> Result<()>;

    /// 删除 `expires_at` 早于 `before` 的记录，返回删除数量
    async fn delete_expired_refresh_tokens(
        &self,
        tx: &mut Self::Tx,
        before: DateTime<Utc>,
    ) -> Result<u64>;
}

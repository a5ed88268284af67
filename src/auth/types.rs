//! # 认证相关类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::store::Account;

/// 普通用户角色
pub const ROLE_USER: &str = "ROLE_USER";
/// 版主角色
pub const ROLE_MODERATOR: &str = "ROLE_MODERATOR";
/// 管理员角色
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// 令牌类型标签
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// 账户类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    ServiceAccount,
    UserAccount,
}

impl AccountKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServiceAccount => "SERVICE_ACCOUNT",
            Self::UserAccount => "USER_ACCOUNT",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SERVICE_ACCOUNT" => Ok(Self::ServiceAccount),
            "USER_ACCOUNT" => Ok(Self::UserAccount),
            other => Err(format!("Unknown account kind: {other}")),
        }
    }
}

/// 签名时写入令牌的会话信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    pub user_type: AccountKind,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SessionPayload {
    /// 由账户及其角色构建
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            firstname: account.firstname.clone(),
            lastname: account.lastname.clone(),
            user_type: account.account_kind,
            roles: account.roles.clone(),
        }
    }
}

/// 令牌中的完整声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub payload: SessionPayload,
    /// 签发时间（Unix 秒）
    pub iat: i64,
    /// 过期时间（Unix 秒）
    pub exp: i64,
    /// 生效时间（Unix 秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

impl SessionClaims {
    #[must_use]
    pub const fn account_id(&self) -> i64 {
        self.payload.id
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.payload.roles.iter().any(|r| r == role)
    }
}

/// 登录与刷新接口的返回结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// 访问令牌过期时间
    pub expiration_at: DateTime<Utc>,
    pub token_type: String,
}

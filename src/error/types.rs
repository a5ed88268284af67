//! # 错误类型定义

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use serde_json::Value;
use thiserror::Error;

use super::{ErrorCategory, ErrorKind};

/// 应用主要错误类型
///
/// 客户端类错误携带面向调用方的 `message` 与可选 `details`；
/// 服务端类错误携带内部原因链，渲染时不会原样暴露。
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求格式或字段校验失败
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<Value>,
    },

    /// 凭证或令牌不可信
    #[error("{message}")]
    Unauthorized {
        message: String,
        details: Option<Value>,
    },

    /// 身份已知，但账户被禁用、过期、锁定或删除
    #[error("{message}")]
    Forbidden {
        message: String,
        details: Option<Value>,
    },

    /// 资源不存在
    #[error("{message}")]
    NotFound {
        message: String,
        details: Option<Value>,
    },

    /// 资源冲突
    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },

    /// 语义错误
    #[error("{message}")]
    UnprocessableEntity {
        message: String,
        details: Option<Value>,
    },

    /// 请求过于频繁
    #[error("{message}")]
    TooManyRequests {
        message: String,
        details: Option<Value>,
    },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 数据库相关错误
    #[error("数据库错误: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl AppError {
    /// 对外可见的错误名称
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::UnprocessableEntity { .. } => ErrorKind::UnprocessableEntity,
            Self::TooManyRequests { .. } => ErrorKind::TooManyRequests,
            Self::Config { .. } | Self::Database { .. } | Self::Internal { .. } => {
                ErrorKind::InternalError
            }
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } | Self::Database { .. } | Self::Internal { .. } => {
                ErrorCategory::Server
            }
            _ => ErrorCategory::Client,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> axum::http::StatusCode {
        self.kind().status_code()
    }

    /// 错误消息（不含分类前缀）
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::UnprocessableEntity { message, .. }
            | Self::TooManyRequests { message, .. }
            | Self::Config { message, .. }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    /// 附加详情（仅客户端类错误）
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::BadRequest { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Forbidden { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::UnprocessableEntity { details, .. }
            | Self::TooManyRequests { details, .. } => details.as_ref(),
            Self::Config { .. } | Self::Database { .. } | Self::Internal { .. } => None,
        }
    }

    /// 为客户端类错误附加详情；服务端类错误保持不变
    #[must_use]
    pub fn with_details(mut self, value: impl Into<Value>) -> Self {
        match &mut self {
            Self::BadRequest { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Forbidden { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::UnprocessableEntity { details, .. }
            | Self::TooManyRequests { details, .. } => *details = Some(value.into()),
            Self::Config { .. } | Self::Database { .. } | Self::Internal { .. } => {}
        }
        self
    }

    /// 创建请求错误
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    /// 创建未认证错误
    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details: None,
        }
    }

    /// 创建禁止访问错误
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::Forbidden {
            message: message.into(),
            details: None,
        }
    }

    /// 创建资源未找到错误
    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::NotFound {
            message: message.into(),
            details: None,
        }
    }

    /// 创建资源冲突错误
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn unprocessable_entity<T: Into<String>>(message: T) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
            details: None,
        }
    }

    pub fn too_many_requests<T: Into<String>>(message: T) -> Self {
        Self::TooManyRequests {
            message: message.into(),
            details: None,
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建数据库错误
    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的数据库错误
    pub fn database_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的内部错误
    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

// 自动转换常见错误类型
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal_with_source("文件操作失败", err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<sea_orm::error::DbErr> for AppError {
    fn from(err: sea_orm::error::DbErr) -> Self {
        Self::database_with_source("数据库操作失败", err)
    }
}

// Bcrypt错误转换
impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::internal_with_source("密码处理失败", err)
    }
}

// 令牌错误转换
impl From<crate::auth::jwt::JwtError> for AppError {
    fn from(err: crate::auth::jwt::JwtError) -> Self {
        use crate::auth::jwt::JwtError;
        match err {
            JwtError::InvalidToken(reason) => {
                Self::unauthorized("Invalid token").with_details(reason)
            }
            JwtError::ExpiredToken => Self::unauthorized("Token has expired"),
            JwtError::NotYetValid => Self::unauthorized("Token not active"),
            JwtError::MissingClaim(ref name) => {
                Self::internal_with_source(format!("Claim {name} not found in token"), err)
            }
            JwtError::Config(ref message) => Self::config_with_source(message.clone(), err),
        }
    }
}

// 请求体/路径/查询参数解析失败
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body").with_details(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query parameters").with_details(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("Invalid path parameter").with_details(rejection.body_text())
    }
}

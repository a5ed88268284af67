//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

use super::{DatabaseConfig, JwtConfig};

/// 应用主配置结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 服务配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 访问令牌签名配置
    pub jwt: JwtConfig,
    /// 刷新令牌配置
    pub refresh_token: RefreshTokenConfig,
    /// 密码哈希配置
    pub password: PasswordConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 允许的CORS源地址，`*` 表示任意
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// 刷新令牌配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshTokenConfig {
    /// 有效期（小时），保留原始字符串，在轮换时才解析
    pub expiration_hours: String,
    /// 刷新时是否重新检查账户状态标志
    pub recheck_account_on_refresh: bool,
    /// 过期记录清理间隔（秒），0 表示禁用
    pub cleanup_interval_seconds: u64,
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            expiration_hours: "720".to_string(),
            recheck_account_on_refresh: false,
            cleanup_interval_seconds: 3600,
        }
    }
}

/// 默认 bcrypt 代价因子
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// 密码哈希配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// bcrypt 代价因子
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

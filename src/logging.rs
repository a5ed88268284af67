//! # 日志配置模块
//!
//! 初始化 tracing 订阅器，并提供带阶段/组件字段的结构化日志宏

use std::env;
use std::fmt;
use tracing_subscriber::{EnvFilter, fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt};

/// 日志所处的处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    Startup,
    Shutdown,
    Configuration,
    Authentication,
    TokenRefresh,
    RequestHandling,
    Database,
    BackgroundTask,
}

impl LogStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::TokenRefresh => "token_refresh",
            Self::RequestHandling => "request_handling",
            Self::Database => "database",
            Self::BackgroundTask => "background_task",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    Main,
    Config,
    Database,
    ServerSetup,
    AuthService,
    Jwt,
    RefreshToken,
    AuthGate,
    Notes,
    CleanupTask,
}

impl LogComponent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Database => "database",
            Self::ServerSetup => "server_setup",
            Self::AuthService => "auth_service",
            Self::Jwt => "jwt",
            Self::RefreshToken => "refresh_token",
            Self::AuthGate => "auth_gate",
            Self::Notes => "notes",
            Self::CleanupTask => "cleanup_task",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 结构化 info 日志
#[macro_export]
macro_rules! linfo {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::info!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = %$operation,
            "{}",
            $message
        )
    };
}

/// 结构化 warn 日志
#[macro_export]
macro_rules! lwarn {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::warn!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = %$operation,
            "{}",
            $message
        )
    };
}

/// 结构化 error 日志
#[macro_export]
macro_rules! lerror {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::error!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = %$operation,
            "{}",
            $message
        )
    };
}

/// 结构化 debug 日志
#[macro_export]
macro_rules! ldebug {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $message:expr $(,)?) => {
        ::tracing::debug!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = %$operation,
            "{}",
            $message
        )
    };
}

/// 默认日志过滤规则：关闭 SQL 语句级别的日志
#[must_use]
pub fn default_filter(level: &str) -> String {
    format!("{level},notes_backend=debug,sqlx::query=off,sea_orm::query=warn")
}

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先于默认过滤规则。
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(
            fmt_layer::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();

    if env::var("RUST_LOG").is_ok_and(|v| v.contains("sqlx::query=info") || v.contains("sqlx::query=debug")) {
        tracing::info!("🔍 SQLx database query logging enabled");
    }
}

/// 令牌脱敏：只保留前 8 个字符
#[must_use]
pub fn sanitize_token(token: &str) -> String {
    let preview: String = token.chars().take(8).collect();
    if token.chars().count() > 8 {
        format!("{preview}***")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_silences_sql() {
        let filter = default_filter("warn");
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("sqlx::query=off"));
        assert!(filter.contains("notes_backend=debug"));
    }

    #[test]
    fn test_sanitize_token() {
        assert_eq!(sanitize_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci***");
        assert_eq!(sanitize_token("short"), "***");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(LogStage::TokenRefresh.to_string(), "token_refresh");
        assert_eq!(LogComponent::AuthGate.to_string(), "auth_gate");
    }
}

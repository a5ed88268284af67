//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理
//!
//! 加载顺序：内置默认值 → TOML 文件 → 环境变量覆盖。

mod app_config;
mod database;
mod jwt;

pub use app_config::{
    AppConfig, DEFAULT_BCRYPT_COST, PasswordConfig, RefreshTokenConfig, ServerConfig,
};
pub use database::DatabaseConfig;
pub use jwt::{ALLOWED_ALGORITHMS, JwtConfig, parse_algorithm, parse_expires_in};

use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ensure_config, linfo};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "NOTES_CONFIG_PATH";

/// 加载配置文件并应用进程环境变量覆盖
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    load_config_with(explicit_path, |key| env::var(key).ok())
}

/// 以给定的变量查找函数加载配置
pub fn load_config_with<F>(explicit_path: Option<&Path>, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match resolve_config_path(explicit_path, &lookup)? {
        Some(path) => load_config_file(&path)?,
        None => {
            linfo!(
                "system",
                LogStage::Configuration,
                LogComponent::Config,
                "use_defaults",
                "未找到配置文件，使用内置默认配置"
            );
            AppConfig::default()
        }
    };

    apply_env_overrides(&mut config, &lookup)?;
    validate_config(&config)?;

    Ok(config)
}

/// 确定配置文件路径
///
/// 显式路径与 `NOTES_CONFIG_PATH` 指向的文件必须存在；
/// `config/config.{RUST_ENV}.toml` 不存在时回退到默认配置。
fn resolve_config_path<F>(explicit_path: Option<&Path>, lookup: &F) -> Result<Option<PathBuf>>
where
    F: Fn(&str) -> Option<String>,
{
    let required = explicit_path
        .map(Path::to_path_buf)
        .or_else(|| lookup(CONFIG_PATH_ENV).map(PathBuf::from));

    if let Some(path) = required {
        if !path.exists() {
            return Err(AppError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let env_name = lookup("RUST_ENV").unwrap_or_else(|| "dev".to_string());
    let conventional = PathBuf::from(format!("config/config.{env_name}.toml"));
    Ok(conventional.exists().then_some(conventional))
}

/// 读取并解析 TOML 配置文件
fn load_config_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
    })?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        AppError::config_with_source(format!("TOML解析失败 - 配置文件: {}", path.display()), e)
    })?;

    linfo!(
        "system",
        LogStage::Configuration,
        LogComponent::Config,
        "config_loaded",
        &format!("已加载配置文件: {}", path.display())
    );
    Ok(config)
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("环境变量 {key} 的值无效: {value}")))
}

/// 应用环境变量覆盖
fn apply_env_overrides<F>(config: &mut AppConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("HOST") {
        config.server.host = v;
    }
    if let Some(v) = lookup("PORT") {
        config.server.port = parse_env("PORT", &v)?;
    }
    if let Some(v) = lookup("DATABASE_URL") {
        config.database.url = v;
    }
    if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
        config.database.max_connections = parse_env("DB_MAX_CONNECTIONS", &v)?;
    }
    if let Some(v) = lookup("JWT_ALGORITHM") {
        config.jwt.algorithm = v;
    }
    if let Some(v) = lookup("JWT_EXPIRES_IN") {
        config.jwt.expires_in = v;
    }
    if let Some(v) = lookup("JWT_SECRET") {
        config.jwt.secret = Some(v);
    }
    if let Some(v) = lookup("JWT_PRIVATE_KEY_PATH") {
        config.jwt.private_key_path = PathBuf::from(v);
    }
    if let Some(v) = lookup("JWT_PUBLIC_KEY_PATH") {
        config.jwt.public_key_path = PathBuf::from(v);
    }
    // 刷新令牌有效期保留原始值，轮换时才校验
    if let Some(v) = lookup("REFRESH_TOKEN_EXPIRATION_HOURS") {
        config.refresh_token.expiration_hours = v;
    }
    if let Some(v) = lookup("BCRYPT_COST") {
        config.password.bcrypt_cost = parse_env("BCRYPT_COST", &v)?;
    }
    Ok(())
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<()> {
    ensure_config!(config.server.port != 0, "无效的服务器端口: {}", config.server.port);
    ensure_config!(!config.server.host.is_empty(), "服务器监听地址不能为空");
    ensure_config!(!config.database.url.is_empty(), "数据库URL不能为空");
    ensure_config!(
        config.database.max_connections > 0,
        "数据库最大连接数必须大于0"
    );
    ensure_config!(
        (4..=31).contains(&config.password.bcrypt_cost),
        "BCRYPT_COST 必须在 4 到 31 之间: {}",
        config.password.bcrypt_cost
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config_with(None, lookup_from(&[("RUST_ENV", "no-such-env")])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.expires_in, "1h");
        assert_eq!(config.refresh_token.expiration_hours, "720");
        assert_eq!(config.password.bcrypt_cost, 10);
        assert!(!config.refresh_token.recheck_account_on_refresh);
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let file = write_config(
            r#"
            [server]
            port = 8081

            [jwt]
            algorithm = "RS256"
            expires_in = "15m"

            [refresh_token]
            recheck_account_on_refresh = true
            "#,
        );

        let config = load_config_with(Some(file.path()), lookup_from(&[])).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.jwt.algorithm, "RS256");
        assert_eq!(config.jwt.expires_in, "15m");
        assert!(config.refresh_token.recheck_account_on_refresh);
        assert_eq!(config.refresh_token.expiration_hours, "720");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = write_config("[server]\nport = 8081\n");
        let lookup = lookup_from(&[
            ("PORT", "9000"),
            ("JWT_SECRET", "from-env"),
            ("JWT_ALGORITHM", "HS512"),
            ("REFRESH_TOKEN_EXPIRATION_HOURS", "not-a-number"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]);

        let config = load_config_with(Some(file.path()), lookup).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.jwt.secret.as_deref(), Some("from-env"));
        assert_eq!(config.jwt.algorithm, "HS512");
        // 刷新令牌有效期在加载阶段不校验
        assert_eq!(config.refresh_token.expiration_hours, "not-a-number");
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_config_path_from_env_var() {
        let file = write_config("[password]\nbcrypt_cost = 4\n");
        let path = file.path().display().to_string();
        let config =
            load_config_with(None, lookup_from(&[(CONFIG_PATH_ENV, path.as_str())])).unwrap();
        assert_eq!(config.password.bcrypt_cost, 4);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = load_config_with(Some(Path::new("/nonexistent/notes.toml")), lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let file = write_config("[server\nport = ");
        let result = load_config_with(Some(file.path()), lookup_from(&[]));
        assert!(matches!(result, Err(AppError::Config { .. })));
    }

    #[rstest::rstest]
    #[case(&[("PORT", "0")])]
    #[case(&[("PORT", "http")])]
    #[case(&[("BCRYPT_COST", "3")])]
    #[case(&[("BCRYPT_COST", "32")])]
    #[case(&[("DB_MAX_CONNECTIONS", "0")])]
    #[case(&[("DATABASE_URL", "")])]
    fn test_invalid_values_rejected(#[case] vars: &[(&str, &str)]) {
        let mut all = vec![("RUST_ENV", "no-such-env")];
        all.extend_from_slice(vars);
        let result = load_config_with(None, lookup_from(&all));
        assert!(matches!(result, Err(AppError::Config { .. })), "{vars:?}");
    }
}

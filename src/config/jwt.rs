//! # 访问令牌签名配置

use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 访问令牌签名配置
///
/// 字段保持原始形式，由 `JwtManager::new` 统一校验。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// 签名算法：HS256/HS384/HS512/RS256/RS384/RS512
    pub algorithm: String,
    /// 访问令牌有效期，如 `3600`、`15m`、`1h`、`7d`
    pub expires_in: String,
    /// HMAC 共享密钥
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// RSA 私钥（签名）
    pub private_key_path: PathBuf,
    /// RSA 公钥（验证）
    pub public_key_path: PathBuf,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: "HS256".to_string(),
            expires_in: "1h".to_string(),
            secret: None,
            private_key_path: PathBuf::from("./keys/private.pem"),
            public_key_path: PathBuf::from("./keys/public.pem"),
        }
    }
}

// secret 不进日志
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("expires_in", &self.expires_in)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .finish()
    }
}

/// 支持的签名算法
pub const ALLOWED_ALGORITHMS: [&str; 6] = ["HS256", "HS384", "HS512", "RS256", "RS384", "RS512"];

/// 解析签名算法名称
pub fn parse_algorithm(name: &str) -> Result<Algorithm, String> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(format!(
            "Invalid JWT_ALGORITHM: {other}, must be one of {}",
            ALLOWED_ALGORITHMS.join(", ")
        )),
    }
}

/// 解析有效期：纯数字按秒计，或带 `s`/`m`/`h`/`d` 后缀
pub fn parse_expires_in(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("JWT_EXPIRES_IN is empty".to_string());
    }

    let (digits, unit_seconds) = match raw.char_indices().last() {
        Some((idx, 's')) => (&raw[..idx], 1),
        Some((idx, 'm')) => (&raw[..idx], 60),
        Some((idx, 'h')) => (&raw[..idx], 3600),
        Some((idx, 'd')) => (&raw[..idx], 86_400),
        _ => (raw, 1),
    };

    let value: i64 = digits
        .parse()
        .map_err(|_| format!("Invalid JWT_EXPIRES_IN: {raw}"))?;
    if value <= 0 {
        return Err(format!("JWT_EXPIRES_IN must be positive: {raw}"));
    }

    value
        .checked_mul(unit_seconds)
        .and_then(Duration::try_seconds)
        .ok_or_else(|| format!("JWT_EXPIRES_IN is out of range: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3600", 3600)]
    #[case("30s", 30)]
    #[case("15m", 900)]
    #[case("1h", 3600)]
    #[case(" 7d ", 604_800)]
    fn test_parse_expires_in(#[case] raw: &str, #[case] seconds: i64) {
        assert_eq!(parse_expires_in(raw).unwrap().num_seconds(), seconds);
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("-5m")]
    #[case("1w")]
    #[case("h")]
    #[case("abc")]
    fn test_parse_expires_in_rejects(#[case] raw: &str) {
        assert!(parse_expires_in(raw).is_err());
    }

    #[test]
    fn test_parse_algorithm() {
        for name in ALLOWED_ALGORITHMS {
            assert!(parse_algorithm(name).is_ok(), "{name}");
        }
        assert!(parse_algorithm("ES256").is_err());
        assert!(parse_algorithm("none").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = JwtConfig {
            secret: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }
}

//! # JWT 令牌管理
//!
//! 签发与校验会话令牌。密钥材料在构建管理器时加载一次，之后每次调用复用。

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

use crate::auth::types::{SessionClaims, SessionPayload};
use crate::config::{JwtConfig, parse_algorithm, parse_expires_in};

/// 令牌编解码错误
#[derive(Debug, Error)]
pub enum JwtError {
    /// 格式错误、签名无效或算法不匹配
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token has expired")]
    ExpiredToken,
    #[error("token is not yet valid")]
    NotYetValid,
    /// 令牌有效但缺少所请求的声明
    #[error("claim {0} not found in token")]
    MissingClaim(String),
    /// 签名配置或密钥材料异常
    #[error("jwt configuration error: {0}")]
    Config(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::ExpiredSignature => Self::ExpiredToken,
            JwtErrorKind::ImmatureSignature => Self::NotYetValid,
            JwtErrorKind::InvalidToken
            | JwtErrorKind::InvalidSignature
            | JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::InvalidIssuer
            | JwtErrorKind::InvalidAudience
            | JwtErrorKind::InvalidSubject
            | JwtErrorKind::MissingRequiredClaim(_)
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => Self::InvalidToken(err.to_string()),
            _ => Self::Config(err.to_string()),
        }
    }
}

/// JWT 令牌管理器
pub struct JwtManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.algorithm)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// 创建管理器，同时校验算法、有效期与密钥
    pub fn new(config: &JwtConfig) -> Result<Self, JwtError> {
        let algorithm = parse_algorithm(config.algorithm.trim()).map_err(JwtError::Config)?;
        let expires_in = parse_expires_in(&config.expires_in).map_err(JwtError::Config)?;

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = config
                    .secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| JwtError::Config("JWT_SECRET is not defined".to_string()))?;
                (
                    EncodingKey::from_secret(secret.as_bytes()),
                    DecodingKey::from_secret(secret.as_bytes()),
                )
            }
            _ => {
                let private_pem = read_key_file(&config.private_key_path, "Private")?;
                let public_pem = read_key_file(&config.public_key_path, "Public")?;
                let encoding_key = EncodingKey::from_rsa_pem(&private_pem).map_err(|e| {
                    JwtError::Config(format!(
                        "Invalid private key at {}: {e}",
                        config.private_key_path.display()
                    ))
                })?;
                let decoding_key = DecodingKey::from_rsa_pem(&public_pem).map_err(|e| {
                    JwtError::Config(format!(
                        "Invalid public key at {}: {e}",
                        config.public_key_path.display()
                    ))
                })?;
                (encoding_key, decoding_key)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
            expires_in,
        })
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 访问令牌有效期
    #[must_use]
    pub const fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// 签发会话令牌，写入 `iat` 与 `exp`
    pub fn sign(&self, payload: &SessionPayload) -> Result<String, JwtError> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            payload: payload.clone(),
            iat,
            exp: iat + self.expires_in.num_seconds(),
            nbf: None,
        };
        self.sign_claims(&claims)
    }

    /// 按原样签发完整声明
    pub fn sign_claims(&self, claims: &SessionClaims) -> Result<String, JwtError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| JwtError::Config(format!("Failed to sign token: {e}")))
    }

    /// 校验签名、算法、`exp` 与 `nbf`
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        Ok(decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?.claims)
    }

    /// 有效令牌的过期时间
    pub fn expiration_of(&self, token: &str) -> Result<DateTime<Utc>, JwtError> {
        let claims = self.verify(token)?;
        DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| JwtError::InvalidToken(format!("exp out of range: {}", claims.exp)))
    }

    /// 读取有效令牌中的单个声明
    pub fn claim(&self, token: &str, name: &str) -> Result<Value, JwtError> {
        let mut claims =
            decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)?.claims;
        match claims.remove(name) {
            Some(Value::Null) | None => Err(JwtError::MissingClaim(name.to_string())),
            Some(value) => Ok(value),
        }
    }
}

fn read_key_file(path: &Path, label: &str) -> Result<Vec<u8>, JwtError> {
    if !path.exists() {
        return Err(JwtError::Config(format!(
            "{label} key file not found at {}",
            path.display()
        )));
    }
    std::fs::read(path).map_err(|e| {
        JwtError::Config(format!(
            "Failed to read {} key from {}: {e}",
            label.to_lowercase(),
            path.display()
        ))
    })
}

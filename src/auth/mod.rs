//! # 认证模块
//!
//! 登录、访问令牌签发校验与刷新令牌轮换。HTTP 层的 Bearer 校验位于
//! `api::middleware::auth`，这里只包含与传输无关的核心逻辑。

pub mod cleanup_task;
pub mod jwt;
pub mod password;
pub mod refresh_token;
pub mod service;
pub mod store;
pub mod types;

pub use cleanup_task::RefreshTokenCleanupTask;
pub use jwt::{JwtError, JwtManager};
pub use password::PasswordHasher;
pub use refresh_token::RefreshTokenManager;
pub use service::AuthSessionService;
pub use store::{Account, CredentialStore, RefreshTokenRecord};
pub use types::{AccountKind, SessionClaims, SessionPayload, TokenResponse};

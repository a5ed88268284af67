//! # 中间件模块

pub mod auth;

pub use auth::{AuthenticatedUser, auth_gate, extract_bearer_token};

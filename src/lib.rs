//! # Notes Backend Library
//!
//! 笔记 REST 服务核心库：认证会话、访问令牌、刷新令牌轮换与笔记 API

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod server_setup;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};

//! # 请求处理器

pub mod auth;
pub mod health;
pub mod notes;
